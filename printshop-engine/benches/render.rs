use criterion::{black_box, criterion_group, criterion_main, Criterion};
use printshop_engine::mixer::{Mixer, MixerCommand};
use printshop_engine::voice::VoiceId;
use printshop_engine::{patches, Engine};
use rand::{rngs::StdRng, SeedableRng};

const SR: f32 = 48_000.0;

fn busy_engine() -> Engine<Mixer> {
    let mut engine = Engine::new(Mixer::new(SR), SR);
    let mut rng = StdRng::seed_from_u64(11);
    let voices = [
        patches::printing(SR, 2.0),
        patches::ambient(SR),
        patches::whoosh(SR),
        patches::footstep(SR, &mut rng),
        patches::chime_note(SR, patches::CHIME_NOTES_HZ[0]),
    ];
    for (i, v) in voices.into_iter().enumerate() {
        engine.generator_mut().apply(MixerCommand::Start(Box::new(v.scheduled(VoiceId(i as u64), 0.0))));
    }
    engine
}

fn render_block(c: &mut Criterion) {
    c.bench_function("mixer 512 frames, 5 voices", |b| {
        let mut engine = busy_engine();
        let mut buf = [0.0f32; 512];
        b.iter(|| {
            engine.render_mono(&mut buf);
            black_box(buf[511]);
        });
    });

    c.bench_function("printing voice 512 frames", |b| {
        let mut v = patches::printing(SR, 1.0e9);
        let mut t = 0.0f64;
        b.iter(|| {
            let mut acc = 0.0;
            for _ in 0..512 {
                acc += v.next(t);
                t += 1.0 / f64::from(SR);
            }
            black_box(acc)
        });
    });
}

criterion_group!(benches, render_block);
criterion_main!(benches);
