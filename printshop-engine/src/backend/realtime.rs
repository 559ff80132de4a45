//! Realtime output through cpal.
//!
//! The mixer lives inside the stream callback. The control side talks to it
//! through a lock-free command queue and reads the clock from an atomic frame
//! counter the callback publishes after every buffer. Voices the mixer is done
//! with travel back on a second queue and are dropped on the control side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use tracing::{debug, error, trace};

use super::{AudioContext, AudioHost, ContextState};
use crate::error::{AudioError, AudioResult};
use crate::graph::Engine;
use crate::mixer::{Mixer, MixerCommand, DEFAULT_VOICE_CAPACITY};
use crate::voice::{Voice, VoiceId};

/// Commands that can wait for the next callback.
const COMMAND_QUEUE_SIZE: usize = 256;

/// Opens the default (or a named) output device.
#[derive(Clone, Debug)]
pub struct CpalHost {
    device: Option<String>,
    sample_rate: Option<u32>,
    start_suspended: bool,
    queue_capacity: usize,
    voice_capacity: usize,
}

impl Default for CpalHost {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: None,
            start_suspended: false,
            queue_capacity: COMMAND_QUEUE_SIZE,
            voice_capacity: DEFAULT_VOICE_CAPACITY,
        }
    }
}

impl CpalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the output device with this exact name.
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device = Some(name.into());
        self
    }

    /// Ask for a sample rate; the closest supported one is used.
    pub fn with_sample_rate(mut self, sr: u32) -> Self {
        self.sample_rate = Some(sr);
        self
    }

    /// Build the stream paused; the first `resume` starts it.
    pub fn start_suspended(mut self, yes: bool) -> Self {
        self.start_suspended = yes;
        self
    }

    pub fn with_voice_capacity(mut self, voices: usize) -> Self {
        self.voice_capacity = voices.max(1);
        self
    }

    fn pick_device(&self) -> AudioResult<cpal::Device> {
        let host = cpal::default_host();
        if let Some(name) = &self.device {
            let devices = host.output_devices().map_err(|e| AudioError::backend(e.to_string()))?;
            for d in devices {
                if d.name().map(|n| n == *name).unwrap_or(false) {
                    return Ok(d);
                }
            }
            return Err(AudioError::DeviceNotFound(name.clone()));
        }
        host.default_output_device()
            .ok_or_else(|| AudioError::unavailable("no default output device"))
    }
}

fn choose_config(device: &cpal::Device, req_sr: Option<u32>) -> AudioResult<cpal::SupportedStreamConfig> {
    let Some(sr) = req_sr else {
        return device.default_output_config().map_err(|e| AudioError::unavailable(e.to_string()));
    };

    // Closest range by sample rate distance.
    let mut best: Option<(u32, cpal::SupportedStreamConfigRange)> = None;
    let ranges = device.supported_output_configs().map_err(|e| AudioError::backend(e.to_string()))?;
    for range in ranges {
        let lo = range.min_sample_rate().0;
        let hi = range.max_sample_rate().0;
        let pen = if (lo..=hi).contains(&sr) { 0 } else { lo.abs_diff(sr).min(hi.abs_diff(sr)) };
        if best.as_ref().map_or(true, |(p, _)| pen < *p) {
            best = Some((pen, range));
        }
    }

    let (_, range) = best.ok_or_else(|| AudioError::UnsupportedFormat("no supported output configs".into()))?;
    let lo = range.min_sample_rate().0;
    let hi = range.max_sample_rate().0;
    Ok(range.with_sample_rate(cpal::SampleRate(sr.clamp(lo, hi))))
}

impl AudioHost for CpalHost {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioContext>> {
        let device = self.pick_device()?;
        let supported = choose_config(&device, self.sample_rate)?;
        let format = supported.sample_format();
        let cfg: cpal::StreamConfig = supported.config();
        let sr = cfg.sample_rate.0 as f32;

        let engine = Engine::new(Mixer::with_capacity(sr, self.voice_capacity), sr);
        let (producer, consumer) = HeapRb::<MixerCommand>::new(self.queue_capacity.max(1)).split();
        let (retire_tx, retired) = HeapRb::<Box<Voice>>::new(2 * self.voice_capacity).split();
        let clock = Arc::new(AtomicU64::new(0));
        let queues = Queues { commands: consumer, retired: retire_tx };

        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, engine, queues, Arc::clone(&clock))?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, engine, queues, Arc::clone(&clock))?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, engine, queues, Arc::clone(&clock))?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };

        let state = if self.start_suspended {
            stream.pause().map_err(|e| AudioError::backend(e.to_string()))?;
            ContextState::Suspended
        } else {
            stream.play().map_err(|e| AudioError::backend(e.to_string()))?;
            ContextState::Running
        };

        debug!(
            device = %device.name().unwrap_or_default(),
            sample_rate = cfg.sample_rate.0,
            channels = cfg.channels,
            ?format,
            ?state,
            "audio context opened"
        );

        Ok(Box::new(CpalContext { stream: Some(stream), producer, retired, clock, sr, state }))
    }
}

/// Callback ends of the two queues.
struct Queues {
    commands: HeapCons<MixerCommand>,
    retired: HeapProd<Box<Voice>>,
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut engine: Engine<Mixer>,
    mut queues: Queues,
    clock: Arc<AtomicU64>,
) -> AudioResult<cpal::Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let channels = usize::from(cfg.channels).max(1);

    device
        .build_output_stream(
            cfg,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Some(cmd) = queues.commands.try_pop() {
                    engine.generator_mut().apply(cmd);
                }
                for frame in output.chunks_mut(channels) {
                    let v = T::from_sample(engine.next());
                    frame.fill(v);
                }
                engine.generator_mut().hand_off_retired(|v| queues.retired.try_push(v));
                clock.store(engine.frames(), Ordering::Release);
            },
            |err| error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::backend(e.to_string()))
}

pub struct CpalContext {
    stream: Option<cpal::Stream>,
    producer: HeapProd<MixerCommand>,
    retired: HeapCons<Box<Voice>>,
    clock: Arc<AtomicU64>,
    sr: f32,
    state: ContextState,
}

impl CpalContext {
    /// Drop the voices the callback has sent back.
    fn collect_retired(&mut self) -> usize {
        let mut n = 0;
        while self.retired.try_pop().is_some() {
            n += 1;
        }
        n
    }

    fn send(&mut self, cmd: MixerCommand) -> AudioResult<()> {
        let freed = self.collect_retired();
        if freed > 0 {
            trace!(freed, "retired voices dropped");
        }
        if self.state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        self.producer.try_push(cmd).map_err(|_| AudioError::QueueFull)
    }
}

impl AudioContext for CpalContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> AudioResult<()> {
        let stream = self.stream.as_ref().ok_or(AudioError::Closed)?;
        stream.play().map_err(|e| AudioError::backend(e.to_string()))?;
        self.state = ContextState::Running;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / f64::from(self.sr)
    }

    fn sample_rate(&self) -> f32 {
        self.sr
    }

    fn set_master_gain(&mut self, gain: f32) -> AudioResult<()> {
        self.send(MixerCommand::MasterGain(gain))
    }

    fn start_voice(&mut self, voice: Voice) -> AudioResult<()> {
        self.send(MixerCommand::Start(Box::new(voice)))
    }

    fn release_voice(&mut self, id: VoiceId, at: f64, fade: f32) -> AudioResult<()> {
        self.send(MixerCommand::Release { id, at, fade })
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("pausing stream on close failed: {e}");
            }
            drop(stream);
            self.collect_retired();
            debug!("audio context closed");
        }
        self.state = ContextState::Closed;
    }
}

impl Drop for CpalContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// Names of the output devices of the default host.
pub fn list_output_devices() -> AudioResult<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.output_devices().map_err(|e| AudioError::backend(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}
