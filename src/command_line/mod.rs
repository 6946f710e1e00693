//! Command line front end for the katas.

/// Argument parsing and one runner per subcommand.
pub(crate) mod cli;
