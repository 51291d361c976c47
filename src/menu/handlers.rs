use crate::component::VideoStabilizer;
use crate::config::Config;
use crate::pause;
use crate::signal::reset_shutdown_signal;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn stabilizer_for(shutdown_signal: &Arc<AtomicBool>, config: &Config) -> VideoStabilizer {
    reset_shutdown_signal(shutdown_signal);
    VideoStabilizer::new(config.clone(), Arc::clone(shutdown_signal))
}

fn print_error(e: &anyhow::Error) {
    eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
}

pub fn run_stabilize_local(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    if let Err(e) = stabilizer_for(shutdown_signal, config).run_local() {
        print_error(&e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_stabilize_url(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    if let Err(e) = stabilizer_for(shutdown_signal, config).run_url() {
        print_error(&e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_tool_check(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    if let Err(e) = stabilizer_for(shutdown_signal, config).run_tool_check() {
        print_error(&e);
    }

    pause(term)?;
    Ok(())
}
