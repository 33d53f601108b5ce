//! Offline rendering through the graph engine into a ring buffer.

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, RingBuffer};
use toneport::{
    AudioBackend, AudioNode, BackendError, Engine, ParseError, ProcessContext, RtrbSink, ToneConfig, ToneError,
    TonePort, ToneRequest, C5_FREQUENCY,
};

const SAMPLE_RATE: u32 = 48_000;

fn offline_port(config: ToneConfig) -> (TonePort<Engine, impl FnMut() -> Result<Engine, BackendError>>, Consumer<f32>) {
    let (producer, consumer) = RingBuffer::new(1 << 18);
    let mut producer = Some(producer);
    let open = move || {
        producer
            .take()
            .map(|p| Engine::new(SAMPLE_RATE).with_output(RtrbSink::mono(p)))
            .ok_or(BackendError::NoOutputDevice)
    };
    (TonePort::new(config, open), consumer)
}

/// Render until the engine clock reaches `seconds`, polling the port after every block
fn render_until<F>(port: &mut TonePort<Engine, F>, seconds: f64)
where
    F: FnMut() -> Result<Engine, BackendError>,
{
    loop {
        let engine = port.backend_mut().expect("active");
        if engine.current_time() >= seconds {
            break;
        }
        engine.process();
        port.poll();
    }
}

fn drain(consumer: &mut Consumer<f32>) -> Vec<f32> {
    std::iter::from_fn(|| consumer.pop().ok()).collect()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

fn at(seconds: f64) -> usize {
    (seconds * SAMPLE_RATE as f64) as usize
}

#[test]
fn decaying_tone_fades_then_is_released() {
    let (mut port, mut consumer) = offline_port(ToneConfig::default());
    port.activate().unwrap();
    let idle_nodes = port.backend_mut().unwrap().node_count();

    let message = format!(r#"{{"frequency": {C5_FREQUENCY}, "sineTerms": [0, 0, 1, 0, 1]}}"#);
    let played = port.play(&message).unwrap();
    assert_eq!(port.backend_mut().unwrap().node_count(), idle_nodes + 2);

    render_until(&mut port, 3.25);
    let samples = drain(&mut consumer);
    assert!(samples.len() >= at(3.25));
    assert_eq!(samples.len() % Buffer::LEN, 0);

    // starts at 10% of full scale
    let onset = peak(&samples[..at(0.02)]);
    assert!(onset <= 0.1 + 1e-4, "onset peak {onset}");
    assert!(onset > 0.08, "onset peak {onset}");

    // one second in, one decade down
    let one_second = peak(&samples[at(1.0)..at(1.02)]);
    assert!(one_second < 0.011 && one_second > 0.008, "peak at 1s {one_second}");

    // nearly silent by the end of the ramp
    assert!(peak(&samples[at(2.9)..at(3.0)]) < 0.0002);

    // stopped and released at 3 s
    assert!(samples[at(3.0)..].iter().all(|&s| s == 0.0));
    let engine = port.backend_mut().unwrap();
    assert_eq!(engine.node_count(), idle_nodes);
    assert!(!engine.contains(played.voice.source));
    assert_eq!(port.active_voices(), 0);
}

#[test]
fn blip_plays_at_master_volume_for_half_a_second() {
    let (mut port, mut consumer) = offline_port(ToneConfig::blip());
    port.activate().unwrap();
    let idle_nodes = port.backend_mut().unwrap().node_count();

    port.play("440").unwrap();
    render_until(&mut port, 0.75);
    let samples = drain(&mut consumer);

    // no decay: the last stretch before the stop is as loud as the start
    let early = peak(&samples[..at(0.05)]);
    let late = peak(&samples[at(0.45)..at(0.5)]);
    assert!(early > 0.09 && early <= 0.1 + 1e-4, "early peak {early}");
    assert!((early - late).abs() < 0.005, "early {early} late {late}");

    assert!(samples[at(0.5)..].iter().all(|&s| s == 0.0));
    // the master stage outlives the tone
    assert_eq!(port.backend_mut().unwrap().node_count(), idle_nodes);
}

#[test]
fn blips_sum_through_the_shared_master() {
    let (mut port, mut consumer) = offline_port(ToneConfig::blip());
    port.activate().unwrap();

    // same pitch, same start: the two voices add in phase
    port.play("440").unwrap();
    port.play("440").unwrap();
    render_until(&mut port, 0.1);

    let both = peak(&drain(&mut consumer));
    assert!(both > 0.18 && both <= 0.2 + 1e-4, "peak {both}");
}

#[test]
fn overlapping_tones_mix_and_release_independently() {
    let (mut port, mut consumer) = offline_port(ToneConfig::default());
    port.activate().unwrap();

    port.play("440").unwrap();
    render_until(&mut port, 1.0);
    port.play("660").unwrap();
    assert_eq!(port.active_voices(), 2);

    render_until(&mut port, 3.5);
    assert_eq!(port.active_voices(), 1);
    render_until(&mut port, 4.25);
    assert_eq!(port.active_voices(), 0);

    let samples = drain(&mut consumer);
    // the second tone is still sounding after the first one stopped
    assert!(peak(&samples[at(3.0)..at(3.1)]) > 0.0005);
    assert!(samples[at(4.0)..].iter().all(|&s| s == 0.0));
}

#[test]
fn out_of_range_pitch_cannot_corrupt_other_tones() {
    let (mut port, mut consumer) = offline_port(ToneConfig::default());
    port.activate().unwrap();

    port.play("440").unwrap();
    assert_eq!(
        port.play(r#"{"frequency": 1e39}"#),
        Err(ToneError::Parse(ParseError::InvalidFrequency))
    );
    // a request built by hand skips the codec; its oscillator stays silent
    port.play_request(&ToneRequest::new(1e39, vec![0.0, 1.0])).unwrap();

    render_until(&mut port, 0.05);
    let samples = drain(&mut consumer);
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(peak(&samples) > 0.09);
}

#[test]
fn nothing_renders_before_a_tone() {
    let (mut port, mut consumer) = offline_port(ToneConfig::default());
    port.activate().unwrap();
    render_until(&mut port, 0.1);
    assert!(drain(&mut consumer).iter().all(|&s| s == 0.0));
}

#[test]
fn released_nodes_reject_updates() {
    let mut engine = Engine::new(SAMPLE_RATE);
    let gain = engine.create_gain(1.0).unwrap();
    engine.release(gain);

    assert_eq!(engine.set_value_at_time(gain, 0.5, 0.0), Err(BackendError::UnknownNode));
    let bus = engine.destination();
    assert_eq!(engine.connect(gain, bus), Err(BackendError::UnknownNode));

    // the bus itself is never released
    engine.release(bus);
    assert!(engine.contains(bus));
}

/// Constant-level source controlled through a [`toneport::Handle`]
struct Level(f32);

impl AudioNode for Level {
    type Message = f32;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = f32>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for level in messages {
            self.0 = level;
        }
        for buffer in outputs.iter_mut() {
            buffer.iter_mut().for_each(|s| *s = self.0);
        }
    }
}

#[test]
fn custom_nodes_join_the_bus() {
    let (producer, mut consumer) = RingBuffer::new(1024);
    let mut engine = Engine::new(SAMPLE_RATE).with_output(RtrbSink::mono(producer));

    let mut level = engine.add(Level(0.25));
    let bus = engine.destination();
    engine.connect(level.id(), bus).unwrap();

    engine.process();
    level.send(0.5).unwrap();
    engine.process();

    let samples = drain(&mut consumer);
    assert_eq!(samples.len(), 2 * Buffer::LEN);
    assert!(samples[..Buffer::LEN].iter().all(|&s| s == 0.25));
    assert!(samples[Buffer::LEN..].iter().all(|&s| s == 0.5));
}
