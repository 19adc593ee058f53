use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Mutex},
};

use benchcmp::{
    black_box, first_of_type,
    plugins::{EventListener, HarnessEvents},
    ArgDescriptor, Benchmark, BenchmarkBuilder, BufferDescriptor, Config, HarnessError,
    RawBuffer, RawPtr, BASELINE_ID,
};

fn newton(x: &mut f64) -> f64 {
    let mut guess = *x / 2.0;
    for _ in 0..15 {
        guess = 0.5 * (guess + *x / guess);
    }
    guess
}

fn counting_sort_std(values: &mut [i32]) -> usize {
    let mut comparisons = 0;
    values.sort_by(|a, b| {
        comparisons += 1;
        a.cmp(b)
    });
    comparisons
}

fn counting_selection_sort(values: &mut [i32]) -> usize {
    let mut comparisons = 0;
    for i in 0..values.len() {
        let mut min = i;
        for j in i + 1..values.len() {
            comparisons += 1;
            if values[j] < values[min] {
                min = j;
            }
        }
        values.swap(i, min);
    }
    comparisons
}

fn unsorted(len: usize) -> Vec<i32> {
    (0..len as i32).map(|i| (i * 7919) % 211 - 100).collect()
}

fn comparison_diff(reference: &usize, comparisons: &usize) -> i64 {
    *comparisons as i64 - *reference as i64
}

#[test]
fn newton_matches_sqrt() {
    let mut bench = Benchmark::new(
        |x: &mut f64| black_box(*x).sqrt(),
        |reference: &f64, output: &f64| reference - output,
        1000,
        (144.0f64,),
    )
    .unwrap();
    bench.insert(newton, "newton").unwrap();
    assert!(bench.run().unwrap());

    let results = bench.results();
    assert_eq!(results[0].id, BASELINE_ID);
    assert_eq!(results[0].output, Some(12.0));
    assert_eq!(results[0].error, Some(0.0));
    let newton = results[1];
    assert!(newton.error.unwrap().abs() < 1e-3);
    assert!(newton.runtime_ns > 0.0);
    assert_eq!(
        newton.speedup,
        Some(bench.baseline().runtime_ns / newton.runtime_ns)
    );
}

#[test]
fn sorting_a_vec_leaves_the_input_alone() {
    let input = unsorted(200);
    let mut bench = BenchmarkBuilder::new(20)
        .value(
            |v: &mut Vec<i32>| counting_sort_std(v),
            comparison_diff,
            (input.clone(),),
        )
        .unwrap();
    bench
        .insert(|v: &mut Vec<i32>| counting_selection_sort(v), "selection")
        .unwrap();
    bench.run().unwrap();

    assert_eq!(bench.args().0, input);
    let reference = counting_sort_std(&mut input.clone());
    let selection = counting_selection_sort(&mut input.clone());
    // Every iteration sorted a fresh unsorted copy, so the counts match a single sort.
    assert_eq!(bench.baseline().output, Some(reference));
    let candidate = bench
        .results()
        .into_iter()
        .find(|record| record.id == "selection")
        .unwrap();
    assert_eq!(candidate.output, Some(selection));
    assert_eq!(candidate.error, Some(selection as i64 - reference as i64));
    assert_eq!(selection, 200 * 199 / 2);
}

#[test]
fn sorting_a_raw_buffer_leaves_the_input_alone() {
    let input = unsorted(128);
    let original = input.clone();
    let mut bench = Benchmark::new(
        |buffer: &mut RawBuffer<i32>, _: &mut usize| counting_sort_std(buffer),
        comparison_diff,
        20,
        (RawPtr::from_slice(&input), input.len()),
    )
    .unwrap();
    assert_eq!(
        bench.descriptors(),
        &[
            ArgDescriptor::RawBuffer(BufferDescriptor::new(128)),
            ArgDescriptor::Scalar
        ]
    );
    bench
        .insert(
            |buffer: &mut RawBuffer<i32>, len: &mut usize| {
                counting_selection_sort(&mut buffer[..*len])
            },
            "selection",
        )
        .unwrap();
    bench.run().unwrap();
    assert_eq!(input, original);
    assert_eq!(
        bench.results()[1].output,
        Some(counting_selection_sort(&mut original.clone()))
    );
}

#[test]
fn report_lists_baseline_first_then_by_runtime() {
    let mut bench = BenchmarkBuilder::new(30)
        .output_only(
            |n: &mut u64| (0..black_box(*n)).sum::<u64>(),
            (20_000u64,),
        )
        .unwrap();
    bench
        .insert(
            |n: &mut u64| (0..black_box(*n * 4)).map(black_box).sum::<u64>() / 4,
            "slow",
        )
        .unwrap();
    bench
        .insert(|n: &mut u64| black_box(*n) * (*n - 1) / 2, "closed_form")
        .unwrap();
    bench.run().unwrap();

    let results = bench.results();
    assert_eq!(results[0].id, BASELINE_ID);
    let candidates: Vec<f64> = results[1..].iter().map(|r| r.runtime_ns).collect();
    assert!(candidates.windows(2).all(|pair| pair[0] <= pair[1]));

    let report = bench.render();
    assert!(report.starts_with(">> Iterations: 30\n"));
    let position = |id: &str| report.find(id).unwrap();
    assert!(position(BASELINE_ID) < position(results[1].id.as_str()));
    assert!(position(results[1].id.as_str()) < position(results[2].id.as_str()));
    assert!(report.contains("199990000"));
}

#[test]
fn unmeasured_candidates_render_placeholders() {
    let mut bench = Benchmark::new(
        |x: &mut f64| *x * 2.0,
        |a: &f64, b: &f64| a - b,
        5,
        (1.5f64,),
    )
    .unwrap();
    bench.insert(|x: &mut f64| *x + *x, "pending").unwrap();

    let results = bench.results();
    assert_eq!(results[1].id, "pending");
    assert!(!results[1].is_measured());
    let table = bench.table();
    assert_eq!(
        table.cells(&table.rows[1]),
        vec!["pending", "0.0000 s", "-", "-", "-"]
    );
    assert_eq!(table.rows[0].output.as_deref(), Some("3.000000"));
}

#[test]
fn second_run_without_inserts_does_nothing() {
    let mut bench = BenchmarkBuilder::new(3).void(|| {}, ()).unwrap();
    assert!(!bench.run().unwrap());
    bench.insert(|| {}, "noop").unwrap();
    assert!(bench.run().unwrap());
    assert!(!bench.run().unwrap());

    let measured = bench.results()[1].runtime_ns;
    bench.insert(|| {}, "later").unwrap();
    assert!(bench.run().unwrap());
    // earlier candidates are not measured again
    let noop = bench
        .results()
        .into_iter()
        .find(|record| record.id == "noop")
        .unwrap()
        .runtime_ns;
    assert_eq!(noop, measured);
}

#[test]
fn errors_surface_to_the_caller() {
    let mut bench = BenchmarkBuilder::new(1).void(|| {}, ()).unwrap();
    bench.insert(|| {}, "once").unwrap();
    assert_eq!(
        bench.insert(|| {}, "once"),
        Err(HarnessError::DuplicateIdentifier("once".to_string()))
    );

    let zero = Benchmark::new(|x: &mut u8| *x, |a: &u8, b: &u8| a ^ b, 0, (1u8,));
    assert!(matches!(zero, Err(HarnessError::InvalidConfiguration(_))));

    let data = [1.0f32; 4];
    let negative = BenchmarkBuilder::new(1).void(
        |_: &mut RawBuffer<f32>, _: &mut i64| {},
        (RawPtr::from_slice(&data), -4i64),
    );
    assert!(matches!(
        negative,
        Err(HarnessError::InvalidConfiguration(_))
    ));

    let too_long = BenchmarkBuilder::new(1)
        .descriptors(vec![ArgDescriptor::RawBuffer(BufferDescriptor::new(5))])
        .void(|_: &mut RawBuffer<f32>| {}, (RawPtr::from_slice(&data),));
    assert!(matches!(
        too_long,
        Err(HarnessError::InvalidConfiguration(_))
    ));
}

#[test]
fn void_functions_compare_captured_state() {
    let mut bench = BenchmarkBuilder::new(10)
        .void_with_state(
            |v: &mut Vec<i32>, _: &mut u32| v.sort(),
            first_of_type::<_, Vec<i32>>,
            |reference: &Vec<i32>, state: &Vec<i32>| {
                reference.iter().zip(state).filter(|(a, b)| a != b).count()
            },
            (vec![5, 3, 9, 1], 4u32),
        )
        .unwrap();
    assert_eq!(bench.baseline().output, Some(vec![1, 3, 5, 9]));
    bench
        .insert(|v: &mut Vec<i32>, _: &mut u32| v.sort_unstable(), "unstable")
        .unwrap();
    bench
        .insert(|v: &mut Vec<i32>, _: &mut u32| v.reverse(), "reversed")
        .unwrap();
    bench.run().unwrap();

    let errors: HashMap<String, Option<usize>> = bench
        .results()
        .into_iter()
        .map(|record| (record.id.clone(), record.error))
        .collect();
    assert_eq!(errors["unstable"], Some(0));
    assert_eq!(errors["reversed"], Some(3));
    assert_eq!(bench.args().0, vec![5, 3, 9, 1]);

    let table = bench.table();
    assert_eq!(table.output_column, None);
    assert!(table.error_column);
}

#[test]
fn missing_state_type_fails_construction() {
    let result = BenchmarkBuilder::new(2).void_with_state(
        |v: &mut Vec<i32>| v.clear(),
        first_of_type::<_, String>,
        |_: &String, _: &String| 0u8,
        (vec![1, 2],),
    );
    assert!(matches!(
        result,
        Err(HarnessError::TypeNotFoundInArguments { .. })
    ));
}

#[test]
fn filter_skips_candidates() {
    let mut config = Config::default();
    config.set_filter(Some("sort".to_string()));
    let mut bench = BenchmarkBuilder::new(2)
        .config(config)
        .output_only(|x: &mut u32| *x, (1u32,))
        .unwrap();
    bench.insert(|x: &mut u32| *x, "quick_sort").unwrap();
    bench.insert(|x: &mut u32| *x, "newton").unwrap();
    bench.run().unwrap();
    let ids: Vec<&str> = bench.results().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![BASELINE_ID, "quick_sort"]);
}

#[derive(Clone, Default)]
struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventListener for EventLog {
    fn name(&self) -> &'static str {
        "event_log"
    }
    fn on_event(&mut self, event: HarnessEvents) {
        let entry = match event {
            HarnessEvents::RunStart { pending } => format!("run_start {}", pending),
            HarnessEvents::MeasureStart { id, iterations } => {
                format!("start {} {}", id, iterations)
            }
            HarnessEvents::MeasureStop { id, .. } => format!("stop {}", id),
            HarnessEvents::RunFailed { id } => format!("run_failed {}", id),
            HarnessEvents::RunStop { measured } => format!("run_stop {}", measured),
        };
        self.events.lock().unwrap().push(entry);
    }
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn plugins_see_every_measurement() {
    let log = EventLog::default();
    let mut bench = BenchmarkBuilder::new(4)
        .add_plugin(log.clone())
        .void(|x: &mut u16| *x += 1, (0u16,))
        .unwrap();
    bench.insert(|x: &mut u16| *x += 2, "a").unwrap();
    bench.insert(|x: &mut u16| *x += 3, "b").unwrap();
    bench.run().unwrap();

    let events = log.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start Baseline 4",
            "stop Baseline",
            "run_start 2",
            "start a 4",
            "stop a",
            "start b 4",
            "stop b",
            "run_stop 2",
        ]
    );
}

#[test]
fn failed_run_closes_with_run_failed() {
    let log = EventLog::default();
    let mut bench = BenchmarkBuilder::new(2)
        .add_plugin(log.clone())
        .void_with_state(
            |x: &mut u8| *x += 1,
            |working: &(u8,)| (working.0 > 0).then_some(working.0),
            |a: &u8, b: &u8| b.wrapping_sub(*a),
            (0u8,),
        )
        .unwrap();
    bench.insert(|x: &mut u8| *x += 2, "good").unwrap();
    bench.insert(|_: &mut u8| {}, "no_state").unwrap();
    assert!(matches!(
        bench.run(),
        Err(HarnessError::TypeNotFoundInArguments { .. })
    ));
    assert!(bench.has_pending());

    let events = log.events.lock().unwrap().clone();
    assert_eq!(
        events[2..],
        [
            "run_start 2",
            "start good 2",
            "stop good",
            "start no_state 2",
            "stop no_state",
            "run_failed no_state",
        ]
    );
}
