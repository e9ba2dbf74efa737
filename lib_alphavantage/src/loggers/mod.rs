/// Installs the `tracing` subscriber with console and rolling JSON file output.
pub mod tracing_setup;
