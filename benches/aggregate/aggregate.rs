use criterion::{criterion_group, criterion_main, Criterion};
use vgsweep::analyze::{aggregate, summary_key_columns};
use vgsweep::sweep::tags;
use vgsweep::{Frame, TagValue};

static REPLICATES: u32 = 50;
static DAYS: usize = 6 * 365;
static COVERAGES: [f64; 4] = [0.0, 0.4, 0.6, 0.8];

fn replicate_frames() -> Vec<Frame> {
    let channels = vec!["Annual EIR".to_string(), "True Prevalence".to_string()];
    let sweep_variables = ["Run_Number".to_string(), "Coverage".to_string()];
    let mut frames = Vec::new();
    for coverage in COVERAGES {
        for run in 0..REPLICATES {
            let mut frame = Frame::new(vec!["Time".to_string()], channels.clone());
            for day in 0..DAYS {
                #[allow(clippy::cast_precision_loss)]
                let t = day as f64;
                frame
                    .push_row(
                        vec![TagValue::from(day)],
                        vec![t.sin() + f64::from(run), 1.0 - coverage],
                    )
                    .expect("row matches frame");
            }
            frame.tag(
                &tags([("Run_Number", run.into()), ("Coverage", coverage.into())]),
                &sweep_variables,
            );
            frames.push(frame);
        }
    }
    frames
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let frames = replicate_frames();
    let group_by = summary_key_columns(
        &["Run_Number".to_string(), "Coverage".to_string()],
        &["Time"],
    );
    let channels = ["Annual EIR".to_string(), "True Prevalence".to_string()];
    c.bench_function("aggregate inset replicates", |bencher| {
        bencher.iter_with_large_drop(|| aggregate(frames.clone(), &group_by, &channels))
    });
}

criterion_group!(aggregate_benches, criterion_benchmark);
criterion_main!(aggregate_benches);
