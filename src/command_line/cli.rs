#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use kata_solver::circuit::pit::{format_pits, parse_pits_file, random_pits};
use kata_solver::circuit::{
    EXAMPLE_PITS_ONE, EXAMPLE_PITS_TWO, Pit, brute_force_start, fuel_trace, search_start_pit,
};
use kata_solver::error::{KataError, Result};
use kata_solver::power_plant::brute_force::brute_force;
use kata_solver::power_plant::graph::{Graph, minimum_spanning_tree};
use kata_solver::power_plant::loc::{EXAMPLE_PLANTS, Loc, format_plants, parse_plants_file, random_plants};
use kata_solver::power_plant::plot::{DEFAULT_PLOT_PATH, plot_cost_curve, plot_probes, plot_tree};
use kata_solver::power_plant::prims::prims;
use kata_solver::power_plant::steiner::{SteinerConfig, SteinerMethod, euclidean_steiner};
use kata_solver::power_plant::ternary_search::{DEFAULT_EPS, ternary_search};
use kata_solver::power_plant::transmission::Orientation;
use kata_solver::tiles::Puzzle;
use kata_solver::tiles::solver::{format_tiles, parse_tiles_file, random_tiles};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Plant coordinates are drawn from `0..=RANDOM_EXTENT` on both axes.
const RANDOM_EXTENT: u32 = 100;

/// Colours used for random tile puzzles.
const RANDOM_COLOURS: usize = 4;

/// Defines the command-line interface for the katas.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "katas", version, about = "Small algorithm katas")]
pub(crate) struct Cli {
    /// An optional instance file. If provided without a subcommand, it is solved with the default
    /// method for its extension (`.plants`, `.pits` or `.tiles`).
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `transmission`, `mst`, `pits`, `tiles`).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Place a straight transmission line through the plant field.
    Transmission {
        /// Plant file, one `x y` pair per line. Defaults to the built-in eight plants.
        #[arg(long)]
        path: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = TransmissionMethod::BruteForce)]
        method: TransmissionMethod,

        #[arg(long, value_enum, default_value_t = Orientation::NorthSouth)]
        orientation: Orientation,

        /// Width of the final ternary search interval.
        #[arg(long, default_value_t = DEFAULT_EPS)]
        eps: f64,

        /// Write a PNG of the cost curve (brute force) or the probes (ternary search).
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_PLOT_PATH)]
        plot: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Connect the plants with a minimum spanning tree.
    Mst {
        /// Plant file. Defaults to the built-in eight plants.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Write a PNG of the tree.
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_PLOT_PATH)]
        plot: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Connect the plants with an approximate Steiner tree.
    Steiner {
        /// Plant file. Defaults to the built-in eight plants.
        #[arg(long)]
        path: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = SteinerMethod::Centroid)]
        method: SteinerMethod,

        /// Centroid insertion rounds.
        #[arg(long, default_value_t = 1)]
        rounds: usize,

        /// Write a PNG of the tree with the Steiner points marked.
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_PLOT_PATH)]
        plot: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Find the pit to start a circular fuel tour from.
    Pits {
        /// Pit file, one `fuel cost` pair per line.
        #[arg(long, conflicts_with = "example")]
        path: Option<PathBuf>,

        /// Which built-in circuit to use when no file is given.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        example: u8,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve an edge-matching tile puzzle.
    Tiles {
        /// Tile file starting with `p tiles <rows> <cols> [frame]`. Defaults to the built-in
        /// framed 3 x 3 puzzle.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Border colour, overriding the one in the file.
        #[arg(long)]
        framed: Option<char>,

        /// Also count every solution.
        #[arg(long, default_value_t = false)]
        count: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Print a random instance in the matching file format.
    Random {
        #[arg(value_enum)]
        kind: InstanceKind,

        /// Number of plants or pits, or the side length of a tile grid.
        #[arg(long, default_value_t = 8)]
        size: usize,

        /// Seed for a reproducible instance.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Solve every instance file in a directory tree.
    Batch {
        dir: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output: probes, candidate points, search progress.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Cross-check the result against a brute-force reference.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print timing and memory statistics.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the full result: every edge, the whole fuel trace, the board.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            debug: false,
            verify: true,
            stats: true,
            print_solution: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum TransmissionMethod {
    /// Try every integer position.
    #[default]
    BruteForce,
    /// Ternary search down to `--eps`.
    Ternary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InstanceKind {
    Plants,
    Pits,
    Tiles,
}

impl InstanceKind {
    /// Kind of instance stored at `path`, judged by its extension.
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "plants" => Some(Self::Plants),
            "pits" => Some(Self::Pits),
            "tiles" => Some(Self::Tiles),
            _ => None,
        }
    }
}

/// Allocated and resident memory in MiB, if jemalloc reports them.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Statistics gathered by one run, printed as a framed table.
#[derive(Debug, Default)]
pub(crate) struct RunStats {
    pub(crate) parse_time: Duration,
    pub(crate) elapsed: Duration,
    /// Rows of the problem section.
    pub(crate) problem: Vec<(&'static str, String)>,
    /// Counters of the search section, printed with their rate.
    pub(crate) counters: Vec<(&'static str, usize)>,
}

impl RunStats {
    fn new(parse_time: Duration, elapsed: Duration) -> Self {
        Self {
            parse_time,
            elapsed,
            ..Self::default()
        }
    }

    fn row(mut self, label: &'static str, value: impl Display) -> Self {
        self.problem.push((label, value.to_string()));
        self
    }

    fn counter(mut self, label: &'static str, value: usize) -> Self {
        self.counters.push((label, value));
        self
    }

    pub(crate) fn print(&self) {
        let elapsed_secs = self.elapsed.as_secs_f64();

        println!("\n=======================[ Problem Statistics ]=========================");
        stat_line("Parse time (s)", format!("{:.3}", self.parse_time.as_secs_f64()));
        for (label, value) in &self.problem {
            stat_line(label, value);
        }

        println!("========================[ Search Statistics ]========================");
        for &(label, value) in &self.counters {
            stat_line_with_rate(label, value, elapsed_secs);
        }
        if let Some((allocated, resident)) = memory_usage() {
            stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
            stat_line("Resident memory (MiB)", format!("{resident:.2}"));
        }
        stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
        println!("=====================================================================");
    }
}

/// Prints the outcome of a cross-check and turns a failure into an error.
fn report_verification(ok: bool, what: impl FnOnce() -> String) -> Result<()> {
    println!("Verified: {ok:?}");
    if ok {
        Ok(())
    } else {
        Err(KataError::Verification(what()))
    }
}

/// Renders a plot if one was asked for. Failures are reported and do not stop the run.
fn write_plot(path: Option<&Path>, draw: impl FnOnce(&Path) -> Result<()>) {
    if let Some(path) = path {
        match draw(path) {
            Ok(()) => println!("Plot written to: {}", path.display()),
            Err(e) => eprintln!("{e}"),
        }
    }
}

/// Reads plants from `path`, or returns the built-in example.
fn load_plants(path: Option<&Path>) -> Result<(Vec<Loc>, Duration)> {
    let time = Instant::now();
    let plants = match path {
        Some(path) => {
            println!("Solving: {}", path.display());
            parse_plants_file(path)?
        }
        None => EXAMPLE_PLANTS.to_vec(),
    };
    Ok((plants, time.elapsed()))
}

/// Places a transmission line and reports the cheapest position.
///
/// # Errors
///
/// If the plant file cannot be read, there are no plants, `eps` is invalid, or verification fails.
pub(crate) fn run_transmission(
    path: Option<&Path>,
    method: TransmissionMethod,
    orientation: Orientation,
    eps: f64,
    plot: Option<&Path>,
    common: &CommonOptions,
) -> Result<()> {
    let (plants, parse_time) = load_plants(path)?;
    if common.debug {
        println!("Plants: {}", plants.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "));
    }

    let time = Instant::now();
    let run_stats = match method {
        TransmissionMethod::BruteForce => {
            let result = brute_force(&plants, orientation)?;
            let elapsed = time.elapsed();

            if common.debug {
                for sample in &result.samples {
                    println!("Line {}: cost {}", sample.line, sample.cost);
                }
            }
            println!("Best {orientation} {}", result.best);

            write_plot(plot, |p| plot_cost_curve(p, &result.samples));

            RunStats::new(parse_time, elapsed).counter("Positions tried", result.samples.len())
        }
        TransmissionMethod::Ternary => {
            let result = ternary_search(&plants, orientation, eps)?;
            let elapsed = time.elapsed();

            if common.debug {
                for (left, right) in result.left_probes.iter().zip(&result.right_probes) {
                    println!(
                        "Probe {:.4} (cost {:.4}) | {:.4} (cost {:.4})",
                        left.line, left.cost, right.line, right.cost
                    );
                }
            }
            println!("Best {orientation} {}", result.best);

            if common.verify {
                match brute_force(&plants, orientation) {
                    Err(KataError::InvalidParameter(reason)) => {
                        println!("Verification skipped: {reason}");
                    }
                    reference => {
                        let reference = reference?;
                        let slack = eps * plants.len() as f64;
                        report_verification(result.best.cost <= reference.best.cost + slack, || {
                            format!(
                                "ternary search cost {} exceeds brute force cost {} by more than {slack}",
                                result.best.cost, reference.best.cost
                            )
                        })?;
                    }
                }
            }

            write_plot(plot, |p| {
                plot_probes(p, &result.left_probes, &result.right_probes)
            });

            RunStats::new(parse_time, elapsed)
                .counter("Iterations", result.iterations)
                .counter("Probes", 2 * result.iterations)
        }
    };

    if common.stats {
        run_stats
            .row("Plants", plants.len())
            .row("Method", format!("{method:?}"))
            .print();
    }
    Ok(())
}

/// Connects the plants with Prim's minimum spanning tree.
///
/// # Errors
///
/// If the plant file cannot be read or verification fails.
pub(crate) fn run_mst(path: Option<&Path>, plot: Option<&Path>, common: &CommonOptions) -> Result<()> {
    let (plants, parse_time) = load_plants(path)?;
    if plants.is_empty() {
        return Err(KataError::EmptyInstance("plants"));
    }

    let time = Instant::now();
    let tree = prims(&plants);
    let elapsed = time.elapsed();

    if common.debug || common.print_solution {
        for edge in &tree.edges {
            println!("{edge}");
        }
    }
    println!("Minimum spanning tree cost: {}", tree.cost);

    if common.verify {
        let reference: f64 = minimum_spanning_tree(&Graph::complete(&plants))
            .iter()
            .map(|&(_, _, w)| w)
            .sum();
        report_verification((tree.cost - reference).abs() < 1e-6, || {
            format!("Prim's cost {} differs from graph MST cost {reference}", tree.cost)
        })?;
    }

    write_plot(plot, |p| plot_tree(p, &plants, &tree.edges, &[]));

    if common.stats {
        RunStats::new(parse_time, elapsed)
            .row("Plants", plants.len())
            .row("Tree edges", tree.edges.len())
            .print();
    }
    Ok(())
}

/// Connects the plants with an approximate Steiner tree.
///
/// # Errors
///
/// If the plant file cannot be read, there are no plants, or verification fails.
pub(crate) fn run_steiner(
    path: Option<&Path>,
    method: SteinerMethod,
    rounds: usize,
    plot: Option<&Path>,
    common: &CommonOptions,
) -> Result<()> {
    let (plants, parse_time) = load_plants(path)?;
    let config = SteinerConfig {
        method,
        rounds,
        ..SteinerConfig::default()
    };

    let time = Instant::now();
    let solution = euclidean_steiner(&plants, &config)?;
    let elapsed = time.elapsed();

    if common.debug {
        for point in &solution.steiner_points {
            println!("Steiner point: {point}");
        }
    }
    if common.print_solution {
        for edge in &solution.tree.edges {
            println!("{edge}");
        }
    }
    println!("{method}: cost {:.4}", solution.tree.cost);
    println!(
        "Minimum spanning tree cost {:.4}, saving {:.4} with {} Steiner points",
        solution.baseline,
        solution.saving(),
        solution.steiner_points.len()
    );

    if common.verify {
        let spans = solution.tree.edges.len() + 1 == solution.nodes.len();
        let cheaper = solution.tree.cost <= solution.baseline + config.tolerance;
        report_verification(spans && cheaper, || {
            format!(
                "tree with {} edges over {} nodes costs {} against {}",
                solution.tree.edges.len(),
                solution.nodes.len(),
                solution.tree.cost,
                solution.baseline
            )
        })?;
    }

    write_plot(plot, |p| {
        plot_tree(p, &solution.nodes, &solution.tree.edges, &solution.steiner_points)
    });

    if common.stats {
        RunStats::new(parse_time, elapsed)
            .row("Plants", plants.len())
            .row("Method", method)
            .counter("Steiner points", solution.steiner_points.len())
            .print();
    }
    Ok(())
}

/// Finds the pit to start the circuit from and prints the fuel on arrival at every pit.
///
/// # Errors
///
/// If the pit file cannot be read or verification fails.
pub(crate) fn run_pits(path: Option<&Path>, example: u8, common: &CommonOptions) -> Result<()> {
    let time = Instant::now();
    let pits: Vec<Pit> = match path {
        Some(path) => {
            println!("Solving: {}", path.display());
            parse_pits_file(path)?
        }
        None if example == 2 => EXAMPLE_PITS_TWO.to_vec(),
        None => EXAMPLE_PITS_ONE.to_vec(),
    };
    let parse_time = time.elapsed();

    if common.debug {
        for pit in &pits {
            println!("{pit}: net {}", pit.net());
        }
    }

    let time = Instant::now();
    let start = search_start_pit(&pits);
    let elapsed = time.elapsed();

    match start {
        Some(start) => {
            println!("Start at pit {}", pits[start].label);
            for (label, fuel) in fuel_trace(&pits, start) {
                println!("Pit {label}: fuel in tank {fuel}");
            }
        }
        None => println!("No pit to start from"),
    }

    if common.verify {
        let reference = brute_force_start(&pits);
        report_verification(start == reference, || {
            format!("greedy start {start:?} differs from brute force start {reference:?}")
        })?;
    }

    if common.stats {
        RunStats::new(parse_time, elapsed)
            .row("Pits", pits.len())
            .row("Net fuel", pits.iter().map(Pit::net).sum::<i64>())
            .print();
    }
    Ok(())
}

/// Solves a tile puzzle and prints the board.
///
/// # Errors
///
/// If the tile file cannot be read or verification fails.
pub(crate) fn run_tiles(
    path: Option<&Path>,
    framed: Option<char>,
    count: bool,
    common: &CommonOptions,
) -> Result<()> {
    let time = Instant::now();
    let mut puzzle = match path {
        Some(path) => {
            println!("Solving: {}", path.display());
            parse_tiles_file(path)?
        }
        None => Puzzle::example(),
    };
    if let Some(colour) = framed {
        puzzle = puzzle.with_frame(Some(kata_solver::tiles::Colour(colour)));
    }
    let parse_time = time.elapsed();

    if common.debug {
        println!("{}", format_tiles(&puzzle));
    }

    let time = Instant::now();
    let (board, search) = puzzle.solve();
    let elapsed = time.elapsed();

    match &board {
        Some(board) => {
            println!("Solution:\n{board}");
            if common.print_solution {
                for placement in board.cells.iter().flatten() {
                    let square = puzzle.squares[placement.square];
                    println!(
                        "{placement}: {}",
                        square.rotated(placement.rotation).iter().map(|c| c.0).collect::<String>()
                    );
                }
            }
        }
        None => println!("No solution found"),
    }

    if common.verify {
        if let Some(board) = &board {
            report_verification(puzzle.verify(board), || {
                "board breaks a matching rule".to_string()
            })?;
        }
    }

    if count {
        println!("Solutions: {}", puzzle.count_solutions(usize::MAX));
    }

    if common.stats {
        RunStats::new(parse_time, elapsed)
            .row("Grid", format!("{} x {}", puzzle.rows, puzzle.cols))
            .row("Frame", puzzle.frame.map_or_else(|| "none".to_string(), |c| c.to_string()))
            .counter("Placements", search.placements)
            .counter("Backtracks", search.backtracks)
            .print();
    }
    Ok(())
}

/// Generates a random instance in the file format of `kind`.
///
/// # Errors
///
/// If a tile puzzle cannot be generated.
pub(crate) fn random_instance(kind: InstanceKind, size: usize, seed: Option<u64>) -> Result<String> {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    Ok(match kind {
        InstanceKind::Plants => format_plants(&random_plants(&mut rng, size, RANDOM_EXTENT)),
        InstanceKind::Pits => format_pits(&random_pits(&mut rng, size)),
        InstanceKind::Tiles => format_tiles(&random_tiles(size, size, RANDOM_COLOURS, &mut rng)?),
    })
}

/// Solves one instance file with the default method for its kind.
///
/// # Errors
///
/// If the extension is not recognised or solving fails.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<()> {
    match InstanceKind::from_path(path) {
        Some(InstanceKind::Plants) => {
            run_transmission(
                Some(path),
                TransmissionMethod::default(),
                Orientation::default(),
                DEFAULT_EPS,
                None,
                common,
            )?;
            run_mst(Some(path), None, common)
        }
        Some(InstanceKind::Pits) => run_pits(Some(path), 1, common),
        Some(InstanceKind::Tiles) => run_tiles(Some(path), None, false, common),
        None => Err(KataError::InvalidParameter(format!(
            "unknown instance type: {}",
            path.display()
        ))),
    }
}

/// Solves every instance file below `path`.
///
/// Files with other extensions are skipped.
///
/// # Errors
///
/// If `path` is not a directory or any instance fails.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<()> {
    if !path.is_dir() {
        return Err(KataError::InvalidParameter(format!(
            "provided path is not a directory: {}",
            path.display()
        )));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if InstanceKind::from_path(file_path).is_none() {
            eprintln!("Skipping: {}", file_path.display());
            continue;
        }

        solve_file(file_path, common)?;
    }

    Ok(())
}
