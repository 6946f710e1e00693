//! # katas
//!
//! `katas` runs a handful of small algorithm exercises from the command line:
//!
//! -   **transmission**: place a straight transmission line through a field of power plants,
//!     by brute force over integer positions or by ternary search.
//! -   **mst**: connect the plants with Prim's minimum spanning tree.
//! -   **steiner**: connect the plants with an approximate Steiner tree, adding junction points
//!     taken from the Delaunay triangulation.
//! -   **pits**: find the pit from which a circular fuel tour can be completed.
//! -   **tiles**: lay out rotatable coloured squares so that neighbouring sides match.
//!
//! Without a path every subcommand runs on its built-in example.
//!
//! ## Usage
//!
//! ```sh
//! katas [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! A bare `PATH` is solved with the default method for its extension (`.plants`, `.pits`,
//! `.tiles`).
//!
//! ### Common Options
//!
//! -   `-d, --debug`: print intermediate data (default: `false`).
//! -   `--verify <BOOL>`: cross-check against a brute-force reference (default: `true`).
//! -   `--stats <BOOL>`: print timing and memory statistics (default: `true`).
//! -   `-p, --print-solution`: print the full result (default: `false`).
//!
//! ## Example Invocations
//!
//! ```sh
//! # Ternary search on the built-in plants, plotting the probes to line_graph.png
//! katas transmission --method ternary --plot
//!
//! # Steiner tree over a plant file
//! katas steiner --path field.plants --method kmb
//!
//! # Second built-in circuit
//! katas pits --example 2
//!
//! # Random tile puzzle, then solve it with a black frame
//! katas random tiles --size 3 --seed 7 > puzzle.tiles
//! katas tiles --path puzzle.tiles --count
//!
//! # Every instance below a directory
//! katas batch instances/
//! ```

use crate::command_line::cli::{
    Cli, Commands, random_instance, run_mst, run_pits, run_steiner, run_tiles, run_transmission,
    solve_dir, solve_file,
};
use clap::{CommandFactory, Parser};
use kata_solver::error::Result;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also provides the memory statistics.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Transmission {
            path,
            method,
            orientation,
            eps,
            plot,
            common,
        }) => run_transmission(
            path.as_deref(),
            method,
            orientation,
            eps,
            plot.as_deref(),
            &common,
        ),
        Some(Commands::Mst { path, plot, common }) => {
            run_mst(path.as_deref(), plot.as_deref(), &common)
        }
        Some(Commands::Steiner {
            path,
            method,
            rounds,
            plot,
            common,
        }) => run_steiner(path.as_deref(), method, rounds, plot.as_deref(), &common),
        Some(Commands::Pits {
            path,
            example,
            common,
        }) => run_pits(path.as_deref(), example, &common),
        Some(Commands::Tiles {
            path,
            framed,
            count,
            common,
        }) => run_tiles(path.as_deref(), framed, count, &common),
        Some(Commands::Random { kind, size, seed }) => {
            print!("{}", random_instance(kind, size, seed)?);
            Ok(())
        }
        Some(Commands::Batch { dir, common }) => solve_dir(&dir, &common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) => solve_file(&path, &cli.common),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}
