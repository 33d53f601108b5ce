//! CPAL audio output sink

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error};

use super::push_interleaved;
use crate::error::BackendError;
use crate::node::{AudioNode, ProcessContext};

/// A sink that outputs audio to a CPAL device
///
/// The CPAL stream runs on its own thread; this node feeds samples
/// into a ring buffer that the stream consumes.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
    /// Device callbacks that ran out of samples, bumped by the stream thread
    underruns: Arc<AtomicUsize>,
    reported_underruns: usize,
}

impl CpalSink {
    /// Open a stream on the given device and config.
    ///
    /// Blocks until the stream thread reports whether the stream started.
    pub fn new(device: &cpal::Device, config: &SupportedStreamConfig) -> Result<Self, BackendError> {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let underruns = Arc::new(AtomicUsize::new(0));

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let device = device.clone();
        let stream_underruns = Arc::clone(&underruns);

        // cpal streams are not Send on every platform; the stream lives on this thread
        std::thread::spawn(move || {
            let started = build_stream(&device, sample_format, &stream_config, consumer, stream_underruns)
                .and_then(|stream| {
                    stream
                        .play()
                        .map(|()| stream)
                        .map_err(|e| BackendError::Stream(e.to_string()))
                });

            match started {
                Ok(_stream) => {
                    let _ = ready_tx.send(Ok(()));
                    // Keep thread alive - stream lives as long as this thread
                    loop {
                        std::thread::park();
                    }
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        ready_rx
            .recv()
            .map_err(|_| BackendError::Stream("stream thread exited".into()))??;

        debug!(sample_rate, channels, buffer_size, "output stream started");

        Ok(Self {
            buffer: producer,
            channels,
            underruns,
            reported_underruns: 0,
        })
    }

    /// Device callbacks so far that found the buffer empty
    pub fn underruns(&self) -> usize {
        self.underruns.load(Ordering::Relaxed)
    }
}

fn write_output<T>(data: &mut [T], consumer: &mut Consumer<f32>, underruns: &AtomicUsize, convert: impl Fn(f32) -> T) {
    let mut starved = false;
    for sample in data.iter_mut() {
        *sample = convert(consumer.pop().unwrap_or_else(|_| {
            starved = true;
            0.0
        }));
    }
    if starved {
        underruns.fetch_add(1, Ordering::Relaxed);
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    underruns: Arc<AtomicUsize>,
) -> Result<cpal::Stream, BackendError> {
    let on_error = |err: cpal::StreamError| error!(?err, "CPAL stream error");

    let stream = match sample_format {
        SampleFormat::F32 => device.build_output_stream(
            stream_config,
            move |data: &mut [f32], _| {
                write_output(data, &mut consumer, &underruns, |s| s)
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_output_stream(
            stream_config,
            move |data: &mut [i16], _| {
                write_output(data, &mut consumer, &underruns, |s| {
                    (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                })
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_output_stream(
            stream_config,
            move |data: &mut [u16], _| {
                write_output(data, &mut consumer, &underruns, |s| {
                    ((s.clamp(-1.0, 1.0) + 1.0) * 0.5 * u16::MAX as f32) as u16
                })
            },
            on_error,
            None,
        ),
        other => {
            return Err(BackendError::Stream(format!("unsupported sample format: {other:?}")));
        }
    };

    stream.map_err(|e| BackendError::Stream(e.to_string()))
}

impl AudioNode for CpalSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        if !push_interleaved(inputs, self.channels, &mut self.buffer) {
            debug!("output buffer full, skipping block");
        }

        let underruns = self.underruns();
        if underruns > self.reported_underruns {
            debug!(total = underruns, "output underrun");
            self.reported_underruns = underruns;
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
