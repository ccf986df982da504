//! Generates the server RSA key pair used to wrap file keys.
//!
//! By default prints `.env` lines with escaped newlines; with `--out-dir`
//! writes `public.pem` and `private.pem` instead.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use strongbox_crypto::{DEFAULT_MODULUS_BITS, MIN_MODULUS_BITS, ServerKeys};
use strongbox_files::config::render_env_lines;
use strongbox_files::key_files::write_pem_files;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "strongbox-keygen", about = "Generate the Strongbox server RSA key pair")]
struct Args {
    /// RSA modulus size in bits.
    #[arg(long, default_value_t = DEFAULT_MODULUS_BITS)]
    bits: usize,

    /// Write PEM files into this directory instead of printing env lines.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Overwrite existing PEM files in --out-dir.
    #[arg(long)]
    force: bool,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    if args.bits < MIN_MODULUS_BITS {
        bail!("--bits must be at least {MIN_MODULUS_BITS}");
    }

    info!("generating RSA-{} key pair", args.bits);
    let keys = ServerKeys::generate(args.bits).context("key generation failed")?;
    let (public_pem, private_pem) = keys.to_pem().context("PEM export failed")?;

    match args.out_dir {
        Some(dir) => {
            let files = write_pem_files(&dir, &public_pem, &private_pem, args.force)
                .with_context(|| format!("cannot write key files to {}", dir.display()))?;
            info!("wrote {} and {}", files.public.display(), files.private.display());
        }
        None => print!("{}", render_env_lines(&public_pem, &private_pem)),
    }

    warn!("keep the private key secret and out of version control");
    Ok(())
}
