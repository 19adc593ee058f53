use rustop::opts;

/// Configure the harness.
///
/// [Config::default] leaves the command line alone, [Config::new] parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Filter should match exact
    pub exact: bool,
    /// Only candidates whose id matches the filter are inserted. The baseline is always
    /// measured.
    pub filter: Option<String>,
    /// Trash CPU cache before every measurement.
    pub cache_trasher: bool,
    /// Verbose output. Prints the classification of the arguments above the report.
    pub verbose: bool,
    /// Overrides the number of iterations passed at construction.
    pub num_iter: Option<usize>,
}

impl Config {
    /// Parses the command line arguments to get the options.
    ///
    /// Prints the help and exits on `--help` or unknown arguments.
    pub fn new() -> Self {
        parse_args()
    }

    /// Manually set the number of iterations each function is called.
    ///
    /// This takes precedence over the iterations passed to the constructor.
    pub fn set_num_iter(&mut self, num_iter: usize) -> &mut Self {
        self.num_iter = Some(num_iter);
        self
    }

    /// Sets the filter candidates are matched against on insert.
    pub fn set_filter(&mut self, filter: Option<String>) -> &mut Self {
        self.filter = filter;
        self
    }

    /// Match the filter exactly instead of as substring.
    pub fn set_exact(&mut self, exact: bool) -> &mut Self {
        self.exact = exact;
        self
    }

    /// Print the argument classification above the report.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Trash CPU cache before every measurement. Defaults to false.
    pub fn set_cache_trasher(&mut self, enable: bool) -> &mut Self {
        self.cache_trasher = enable;
        self
    }

    /// Whether a candidate with `id` passes the filter.
    pub fn matches(&self, id: &str) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        if self.exact {
            id == filter
        } else {
            id.contains(filter.as_str())
        }
    }
}

pub(crate) fn parse_args() -> Config {
    let res = opts! {
        synopsis "Compares candidate functions against a baseline.";
        opt bench:bool, desc:"bench flag passed by cargo";
        opt exact:bool, desc:"Filter candidates by exact id rather than by pattern.";
        opt verbose:bool, desc:"Print the argument classification above the report.";
        opt iterations:Option<usize>, desc:"Override the number of iterations.";
        opt cache_trasher:bool, desc:"Trash the CPU cache before every measurement.";
        param filter:Option<String>, desc:"insert only candidates containing id."; // an optional positional parameter
    }
    .parse();
    match res {
        Ok((args, _rest)) => Config {
            exact: args.exact,
            filter: args.filter,
            cache_trasher: args.cache_trasher,
            verbose: args.verbose,
            num_iter: args.iterations,
        },
        Err(rustop::Error::Help(help)) => {
            println!("{}", help);
            std::process::exit(0);
        }
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    }
}
