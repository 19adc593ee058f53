use std::io;

use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};
use yansi::Condition;

use crate::{
    args::{ArgDescriptor, ArgPlan, ArgSet},
    bench_fn::{boxed, BenchFn, BoxedFn},
    comparison::{Comparison, OutputOnly, StateMetric, TimingOnly, ValueMetric},
    config::Config,
    error::{HarnessError, Result},
    output_value::OutputValue,
    plugins::{
        CacheTrasher, EventListener, EventManager, HarnessEvents, PeakMemAllocPlugin,
        ALLOC_EVENT_LISTENER_NAME,
    },
    record::{ranked, Record},
    report::{PlainReporter, ReportRow, Reporter, ResultTable},
    timing::{time_n, Measurement, OutputPick},
};

/// Id of the baseline record. Candidates can't use it.
pub const BASELINE_ID: &str = "Baseline";

/// Compares candidate functions against a baseline.
///
/// The baseline is measured once, when the harness is built. Candidates are registered
/// with [insert](Benchmark::insert) and measured by [run](Benchmark::run); every function
/// gets its own fresh copy of the arguments before each call.
///
/// `A` is the argument tuple, `R` the return type shared by all functions, and `C` the
/// [Comparison] deciding what is stored and compared.
///
/// # Example
/// ```
/// use benchcmp::{black_box, Benchmark};
///
/// fn newton(x: &mut f64) -> f64 {
///     let mut guess = *x / 2.0;
///     for _ in 0..20 {
///         guess = 0.5 * (guess + *x / guess);
///     }
///     guess
/// }
///
/// let mut bench = Benchmark::new(
///     |x: &mut f64| black_box(*x).sqrt(),
///     |reference: &f64, output: &f64| reference - output,
///     1000,
///     (144.0f64,),
/// )
/// .unwrap();
/// bench.insert(newton, "newton").unwrap();
/// assert!(bench.run().unwrap());
///
/// let newton = bench.results()[1];
/// assert!(newton.error.unwrap().abs() < 1e-3);
/// bench.print();
/// ```
pub struct Benchmark<'a, A: ArgSet, R, C: Comparison<A::Working, R>> {
    plan: ArgPlan<A>,
    iterations: usize,
    comparison: C,
    baseline: Record<C::Output, C::Error>,
    candidates: Vec<BoxedFn<'a, A::Working, R>>,
    records: Vec<Record<C::Output, C::Error>>,
    ids: FxHashSet<String>,
    /// Index of the first candidate not measured yet.
    pending: Option<usize>,
    config: Config,
    events: EventManager,
    reporter: Box<dyn Reporter>,
}

impl<'a, A, R, M, E> Benchmark<'a, A, R, ValueMetric<M, E>>
where
    A: ArgSet,
    R: OutputValue,
    E: OutputValue,
    M: Fn(&R, &R) -> E,
{
    /// Measures `baseline` on `args` and compares candidates by their return value.
    ///
    /// The error of a candidate is `metric(&baseline_output, &candidate_output)`.
    /// Descriptors are inferred from `args`. Use [BenchmarkBuilder] for the other
    /// comparisons and options.
    pub fn new<B>(baseline: B, metric: M, iterations: usize, args: A) -> Result<Self>
    where
        B: BenchFn<A::Working, R> + 'a,
    {
        BenchmarkBuilder::new(iterations).value(baseline, metric, args)
    }
}

impl<'a, A, R, C> Benchmark<'a, A, R, C>
where
    A: ArgSet,
    C: Comparison<A::Working, R>,
{
    /// Registers a candidate.
    ///
    /// Fails with [HarnessError::DuplicateIdentifier] if `id` is the baseline id or already
    /// taken. Candidates not matching [Config::filter] are skipped.
    pub fn insert<F>(&mut self, fun: F, id: impl Into<String>) -> Result<()>
    where
        F: BenchFn<A::Working, R> + 'a,
    {
        let id = id.into();
        if id == BASELINE_ID || self.ids.contains(&id) {
            return Err(HarnessError::DuplicateIdentifier(id));
        }
        if !self.config.matches(&id) {
            debug!("Skipping {}, it does not match the filter", id);
            return Ok(());
        }
        debug!("Inserting candidate {}", id);
        if self.pending.is_none() {
            self.pending = Some(self.records.len());
        }
        self.ids.insert(id.clone());
        self.candidates.push(boxed(fun));
        self.records.push(Record::unmeasured(id));
        Ok(())
    }

    /// Measures all candidates inserted since the last run.
    ///
    /// Returns `Ok(false)` if there was nothing to measure. Records are only updated if
    /// every pending candidate was measured; on error the candidates stay pending and
    /// listeners get [HarnessEvents::RunFailed] instead of [HarnessEvents::RunStop].
    pub fn run(&mut self) -> Result<bool> {
        let Some(start) = self.pending else {
            debug!("No pending candidates");
            return Ok(false);
        };
        let Some(reference) = self.baseline.output.as_ref() else {
            return Err(HarnessError::invalid("baseline was not measured"));
        };
        let pending = self.candidates.len() - start;
        self.events.emit(HarnessEvents::RunStart { pending });

        let mut measured = Vec::with_capacity(pending);
        for (fun, record) in self.candidates[start..].iter().zip(&self.records[start..]) {
            let measured_output = measure(
                &mut self.events,
                &record.id,
                &self.plan,
                &**fun,
                self.iterations,
                OutputPick::Last,
            )
            .and_then(|measurement| {
                let output = self
                    .comparison
                    .capture(measurement.output, &measurement.working)?;
                Ok((measurement.average_ns, output))
            });
            let (average_ns, output) = match measured_output {
                Ok(measured_output) => measured_output,
                Err(err) => {
                    self.events
                        .emit(HarnessEvents::RunFailed { id: record.id.as_str() });
                    debug!("Run aborted at {}: {}", record.id, err);
                    return Err(err);
                }
            };
            let error = self.comparison.compare(reference, &output);
            let speedup = speedup(self.baseline.runtime_ns, average_ns);
            let peak_memory = peak_memory(&mut self.events, &record.id);
            measured.push((average_ns, speedup, output, error, peak_memory));
        }

        for (record, (runtime_ns, speedup, output, error, peak_memory)) in
            self.records[start..].iter_mut().zip(measured)
        {
            record.runtime_ns = runtime_ns;
            record.speedup = Some(speedup);
            record.output = Some(output);
            record.error = Some(error);
            record.peak_memory = peak_memory;
        }
        self.pending = None;
        self.events.emit(HarnessEvents::RunStop { measured: pending });
        debug!("Measured {} candidates", pending);
        Ok(true)
    }

    /// The baseline first, then the candidates by ascending runtime. Unmeasured candidates
    /// come last in insertion order.
    pub fn results(&self) -> Vec<&Record<C::Output, C::Error>> {
        ranked(&self.baseline, &self.records)
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        let stdout = io::stdout();
        if let Err(err) = self.write_report(&mut stdout.lock()) {
            warn!("Failed to print report: {}", err);
        }
    }

    /// Prints the report to stdout. Same as [print](Benchmark::print).
    pub fn get_results(&self) {
        self.print();
    }

    /// Writes the report with the configured [Reporter].
    pub fn write_report(&self, out: &mut dyn io::Write) -> io::Result<()> {
        self.reporter.report(&self.table(), out)
    }

    /// The report as string.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        if let Err(err) = self.write_report(&mut out) {
            warn!("Failed to render report: {}", err);
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// The report data, as handed to the [Reporter].
    pub fn table(&self) -> ResultTable {
        let columns = self.comparison.columns();
        let rows: Vec<ReportRow> = self
            .results()
            .into_iter()
            .map(|record| ReportRow {
                id: record.id.clone(),
                runtime_ns: record.runtime_ns,
                speedup: record.speedup,
                memory: record.peak_memory,
                output: record
                    .output
                    .as_ref()
                    .and_then(|output| self.comparison.format_output(output)),
                error: record
                    .error
                    .as_ref()
                    .and_then(|error| self.comparison.format_error(error)),
            })
            .collect();
        ResultTable {
            iterations: self.iterations,
            arguments: self.config.verbose.then(|| describe(self.descriptors())),
            output_column: columns.output,
            error_column: columns.error,
            memory_column: rows.iter().any(|row| row.memory.is_some()),
            rows,
        }
    }

    /// The baseline record.
    pub fn baseline(&self) -> &Record<C::Output, C::Error> {
        &self.baseline
    }

    /// One descriptor per argument position.
    pub fn descriptors(&self) -> &[ArgDescriptor] {
        self.plan.descriptors()
    }

    /// Number of calls per measurement.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether candidates are waiting for [run](Benchmark::run).
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The original arguments.
    pub fn args(&self) -> &A {
        self.plan.original()
    }

    /// The event manager, e.g. to read data collected by plugins.
    pub fn events(&mut self) -> &mut EventManager {
        &mut self.events
    }
}

/// Builds a [Benchmark] with options and picks the [Comparison].
///
/// ```
/// use benchcmp::{first_of_type, BenchmarkBuilder, Config};
///
/// let mut config = Config::default();
/// config.set_verbose(true);
///
/// let mut bench = BenchmarkBuilder::new(100)
///     .config(config)
///     .void_with_state(
///         |v: &mut Vec<u32>| v.sort(),
///         first_of_type::<_, Vec<u32>>,
///         |reference: &Vec<u32>, state: &Vec<u32>| (reference != state) as u8,
///         (vec![3u32, 1, 2],),
///     )
///     .unwrap();
/// bench.insert(|v: &mut Vec<u32>| v.sort_unstable(), "unstable").unwrap();
/// bench.run().unwrap();
/// assert_eq!(bench.results()[1].error, Some(0));
/// ```
pub struct BenchmarkBuilder {
    iterations: usize,
    config: Config,
    descriptors: Option<Vec<ArgDescriptor>>,
    events: EventManager,
    reporter: Box<dyn Reporter>,
}

impl BenchmarkBuilder {
    /// Measures every function `iterations` times, unless [Config::num_iter] is set.
    pub fn new(iterations: usize) -> Self {
        yansi::whenever(Condition::TTY_AND_COLOR);
        Self {
            iterations,
            config: Config::default(),
            descriptors: None,
            events: EventManager::new(),
            reporter: Box::new(PlainReporter::new()),
        }
    }

    /// Sets the options. See [Config::new] to read them from the command line.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Uses explicit descriptors instead of inferring them from the arguments.
    pub fn descriptors(mut self, descriptors: Vec<ArgDescriptor>) -> Self {
        self.descriptors = Some(descriptors);
        self
    }

    /// Adds a plugin, unless one with the same name is already present.
    pub fn add_plugin<L: EventListener + 'static>(mut self, listener: L) -> Self {
        self.events.add_listener_if_absent(listener);
        self
    }

    /// Tracks peak memory of every measurement with `alloc`, which must be the global
    /// allocator. Adds the Memory column to the report.
    pub fn track_memory(self, alloc: &'static dyn peakmem_alloc::PeakMemAllocTrait) -> Self {
        self.add_plugin(PeakMemAllocPlugin::new(alloc))
    }

    /// Sets the reporter. The default is the [PlainReporter].
    pub fn set_reporter<Rep: Reporter + 'static>(mut self, reporter: Rep) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Compares return values with `metric(&baseline_output, &candidate_output)`.
    pub fn value<'a, A, R, E, B, M>(
        self,
        baseline: B,
        metric: M,
        args: A,
    ) -> Result<Benchmark<'a, A, R, ValueMetric<M, E>>>
    where
        A: ArgSet,
        R: OutputValue,
        E: OutputValue,
        B: BenchFn<A::Working, R> + 'a,
        M: Fn(&R, &R) -> E,
    {
        self.build(boxed(baseline), ValueMetric::new(metric), args)
    }

    /// Shows return values without computing an error.
    pub fn output_only<'a, A, R, B>(
        self,
        baseline: B,
        args: A,
    ) -> Result<Benchmark<'a, A, R, OutputOnly>>
    where
        A: ArgSet,
        R: OutputValue,
        B: BenchFn<A::Working, R> + 'a,
    {
        self.build(boxed(baseline), OutputOnly, args)
    }

    /// Compares state captured from the arguments after the calls of void functions.
    ///
    /// `capture` sees the working set after the final call, e.g.
    /// [first_of_type](crate::first_of_type). The error is `metric(&baseline_state,
    /// &candidate_state)`.
    pub fn void_with_state<'a, A, B, G, M, S, E>(
        self,
        baseline: B,
        capture: G,
        metric: M,
        args: A,
    ) -> Result<Benchmark<'a, A, (), StateMetric<G, M, S, E>>>
    where
        A: ArgSet,
        B: BenchFn<A::Working, ()> + 'a,
        G: Fn(&A::Working) -> Option<S>,
        M: Fn(&S, &S) -> E,
        E: OutputValue,
    {
        self.build(boxed(baseline), StateMetric::new(capture, metric), args)
    }

    /// Only compares runtimes of void functions.
    pub fn void<'a, A, B>(self, baseline: B, args: A) -> Result<Benchmark<'a, A, (), TimingOnly>>
    where
        A: ArgSet,
        B: BenchFn<A::Working, ()> + 'a,
    {
        self.build(boxed(baseline), TimingOnly, args)
    }

    fn build<'a, A, R, C>(
        self,
        baseline: BoxedFn<'a, A::Working, R>,
        comparison: C,
        args: A,
    ) -> Result<Benchmark<'a, A, R, C>>
    where
        A: ArgSet,
        C: Comparison<A::Working, R>,
    {
        let BenchmarkBuilder {
            iterations,
            config,
            descriptors,
            mut events,
            reporter,
        } = self;
        let iterations = config.num_iter.unwrap_or(iterations);
        if iterations == 0 {
            return Err(HarnessError::invalid("iterations must be at least 1"));
        }
        let plan = match descriptors {
            Some(descriptors) => ArgPlan::with_descriptors(args, descriptors)?,
            None => ArgPlan::new(args)?,
        };
        debug!(
            "Arguments classified as [{}], {} iterations",
            describe(plan.descriptors()),
            iterations
        );
        if config.cache_trasher {
            events.add_listener_if_absent(CacheTrasher::default());
        }

        let measurement = measure(
            &mut events,
            BASELINE_ID,
            &plan,
            &*baseline,
            iterations,
            OutputPick::First,
        )?;
        let output = comparison.capture(measurement.output, &measurement.working)?;
        let error = comparison.compare(&output, &output);
        let baseline = Record {
            runtime_ns: measurement.average_ns,
            speedup: Some(1.0),
            output: Some(output),
            error: Some(error),
            peak_memory: peak_memory(&mut events, BASELINE_ID),
            ..Record::unmeasured(BASELINE_ID.to_string())
        };

        Ok(Benchmark {
            plan,
            iterations,
            comparison,
            baseline,
            candidates: Vec::new(),
            records: Vec::new(),
            ids: FxHashSet::default(),
            pending: None,
            config,
            events,
            reporter,
        })
    }
}

fn measure<A, R, F>(
    events: &mut EventManager,
    id: &str,
    plan: &ArgPlan<A>,
    fun: &F,
    iterations: usize,
    pick: OutputPick,
) -> Result<Measurement<R, A::Working>>
where
    A: ArgSet,
    F: Fn(&mut A::Working) -> R + ?Sized,
{
    events.emit(HarnessEvents::MeasureStart { id, iterations });
    let measurement = time_n(plan, fun, iterations, pick)?;
    events.emit(HarnessEvents::MeasureStop {
        id,
        average_ns: measurement.average_ns,
    });
    trace!("{} took {} ns on average", id, measurement.average_ns);
    Ok(measurement)
}

fn peak_memory(events: &mut EventManager, id: &str) -> Option<usize> {
    events
        .downcast_listener::<PeakMemAllocPlugin>(ALLOC_EVENT_LISTENER_NAME)
        .and_then(|plugin| plugin.peak_memory(id))
}

fn speedup(baseline_ns: f64, candidate_ns: f64) -> f64 {
    if candidate_ns > 0.0 {
        baseline_ns / candidate_ns
    } else {
        warn!("Candidate runtime below timer resolution, speedup is unbounded");
        f64::INFINITY
    }
}

fn describe(descriptors: &[ArgDescriptor]) -> String {
    descriptors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
