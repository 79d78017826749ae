use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

const PITCH: f32 = 440.0;
const VOLUME: f32 = 0.2;

pub trait Sound {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
}

/// Picks the output for the session. A missing or broken audio device is not
/// fatal: the machine still runs, just silently.
pub fn open(muted: bool) -> Box<dyn Sound> {
    if muted {
        return Box::new(Mute);
    }
    match Beeper::new() {
        Ok(beeper) => Box::new(beeper),
        Err(err) => {
            log::warn!("audio unavailable, running muted: {err:#}");
            Box::new(Mute)
        }
    }
}

/// A sine tone on the default output device, built once and then paused or
/// resumed as the sound timer changes.
pub struct Beeper {
    stream: cpal::Stream,
    playing: bool,
}

impl Beeper {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no output device available")?;
        let supported_config = device
            .supported_output_configs()
            .context("error while querying configs")?
            .next()
            .context("output device has no supported config")?
            .with_max_sample_rate();
        let format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();

        let stream = match format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config),
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config),
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config),
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config),
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config),
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config),
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config),
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config),
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config),
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config),
            sample_format => bail!("unsupported sample format '{sample_format}'"),
        }?;
        // some hosts start a stream as soon as it is built
        stream.pause().context("failed to pause audio stream")?;
        log::debug!(
            "audio: {} Hz, {} channel(s), {format:?}",
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            stream,
            playing: false,
        })
    }

    fn build<T>(device: &cpal::Device, config: &cpal::StreamConfig) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            sample_clock = (sample_clock + 1.0) % sample_rate;
            VOLUME * (sample_clock * PITCH * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err: cpal::StreamError| log::error!("an error occurred on stream: {err}");

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    write_data(data, channels, &mut next_value)
                },
                err_fn,
                None,
            )
            .context("failed to build audio stream")?;
        Ok(stream)
    }
}

impl Sound for Beeper {
    fn play(&mut self) -> Result<()> {
        if !self.playing {
            self.stream.play().context("failed to start beep")?;
            self.playing = true;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.playing {
            self.stream.pause().context("failed to stop beep")?;
            self.playing = false;
        }
        Ok(())
    }
}

fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
where
    T: Sample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let value: T = T::from_sample(next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}

pub struct Mute;

impl Sound for Mute {
    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }
}
