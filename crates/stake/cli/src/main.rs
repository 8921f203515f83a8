//! `stake` binary entry point

fn main() -> anyhow::Result<()> {
    stake_cli::run()?;
    Ok(())
}
