use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dasp_graph::Buffer;
use toneport::nodes::{Oscillator, OscillatorMessage};
use toneport::{AudioBackend, AudioNode, Engine, PeriodicWave, ProcessContext, DEFAULT_HARMONICS};

fn harmonics() -> Vec<f32> {
    DEFAULT_HARMONICS.iter().map(|&h| h as f32).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("PeriodicWave.render()", |b| {
        let wave = PeriodicWave::from_sine_terms(&harmonics());
        b.iter(|| black_box(wave.render()))
    });

    c.bench_function("Oscillator.process()", |b| {
        let wave = PeriodicWave::from_sine_terms(&harmonics());
        let mut osc = Oscillator::new(523.25, &wave);
        let mut output = [Buffer::default()];
        let mut ctx = ProcessContext { sample_rate: 48_000, buffer_size: Buffer::LEN, frame: 0 };
        osc.process(&ctx, std::iter::once(OscillatorMessage::Start(0.0)), &[], &mut output);

        b.iter(|| {
            ctx.frame += Buffer::LEN as u64;
            osc.process(&ctx, std::iter::empty(), &[], &mut output);
            black_box(&output);
        })
    });

    c.bench_function("Engine.process() x16 voices", |b| {
        let mut engine = Engine::new(48_000);
        let wave = engine.create_periodic_wave(vec![0.0; 5], harmonics());
        let bus = engine.destination();
        for i in 0..16 {
            let osc = engine.create_oscillator(220.0 + 55.0 * i as f32, &wave).unwrap();
            let gain = engine.create_gain(0.1).unwrap();
            engine.set_value_at_time(gain, 0.1, 0.0).unwrap();
            engine.exponential_ramp_to_value_at_time(gain, 0.0001, 3.0).unwrap();
            engine.connect(osc, gain).unwrap();
            engine.connect(gain, bus).unwrap();
            engine.start(osc, 0.0);
        }

        b.iter(|| engine.process())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
