/*!
 * Timeline Server - Main Entry Point
 *
 * Reads JSON requests from stdin and writes one JSON response per line to
 * stdout. With no arguments requests are handled sequentially; a single
 * numeric argument selects parallel mode with that many workers.
 *
 * Configuration and startup errors are rendered as miette reports, with the
 * diagnostic code and help text.
 */

use miette::Result;
use std::io::{self, BufWriter};
use tracing::info;

use timeline_server::server::{JsonRequestDecoder, JsonResponseEncoder};
use timeline_server::{init_tracing, run, ServerConfig};

fn main() -> Result<()> {
    // Initialize structured tracing
    init_tracing();

    let config = ServerConfig::from_args(std::env::args().skip(1))?.with_env_overrides()?;
    info!(
        mode = ?config.mode,
        consumers = config.consumers(),
        max_readers = config.max_readers,
        "Configuration loaded"
    );

    let stdin = io::stdin();
    let decoder = JsonRequestDecoder::new(stdin.lock());
    let encoder = JsonResponseEncoder::new(BufWriter::new(io::stdout()));

    let summary = run(&config, decoder, encoder)?;
    info!(
        answered = summary.answered,
        malformed = summary.malformed,
        write_failures = summary.write_failures,
        "Shutdown complete"
    );

    Ok(())
}
