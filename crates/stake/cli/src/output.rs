//! Report rendering

use crate::config::StakeConfig;
use crate::error::CliResult;
use crate::scenario::{ScenarioReport, StepStatus};
use crate::OutputFormat;

pub fn print_report(report: &ScenarioReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", render_text(report)),
    }
    Ok(())
}

pub fn print_check(config: &StakeConfig) {
    println!("Scenario OK");
    println!(
        "  Pool: threshold {} over {}s, deployed by {}",
        config.pool.threshold, config.pool.duration_secs, config.pool.deployer
    );
    println!(
        "  Safe: {} of {} owners",
        config.safe.required_signatures,
        config.safe.owners.len()
    );
    println!("  Accounts: {}", config.accounts.len());
    println!("  Steps: {}", config.steps.len());
}

fn render_text(report: &ScenarioReport) -> String {
    let mut out = String::new();

    out.push_str("Steps:\n");
    for step in &report.steps {
        let line = match &step.status {
            StepStatus::Ok { detail } => format!("  [{}] {:<10} ok       {}\n", step.index, step.action, detail),
            StepStatus::Rejected { error } => {
                format!("  [{}] {:<10} rejected {}\n", step.index, step.action, error)
            }
        };
        out.push_str(&line);
    }

    let pool = &report.pool;
    out.push_str(&format!("Pool {}\n", pool.address));
    out.push_str(&format!("  threshold:      {}\n", pool.threshold));
    out.push_str(&format!("  balance:        {}\n", pool.total_balance));
    out.push_str(&format!("  completed:      {}\n", pool.staking_completed));
    out.push_str(&format!("  safe created:   {}\n", pool.safe_created));
    out.push_str(&format!("  withdraw open:  {}\n", pool.open_for_withdraw));
    out.push_str(&format!("  time remaining: {}s\n", pool.time_remaining_secs));

    if let Some(safe) = &report.safe {
        out.push_str(&format!("Safe {}\n", safe.address));
        out.push_str(&format!("  balance:        {}\n", safe.balance));
        out.push_str(&format!("  quorum:         {}\n", safe.required_signatures));
        out.push_str(&format!(
            "  transactions:   {} ({} pending)\n",
            safe.transactions,
            safe.pending.len()
        ));
    }

    out.push_str("Balances:\n");
    for (address, balance) in &report.balances {
        out.push_str(&format!("  {:<44} {}\n", address, balance));
    }
    out.push_str(&format!("Events: {}\n", report.events.len()));
    out
}
