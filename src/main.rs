use anyhow::Result;
use auto_video_stabilizer::config::types::Config;
use auto_video_stabilizer::init;
use auto_video_stabilizer::menu::main_menu::goodbye_message;
use auto_video_stabilizer::menu::show_main_menu;
use auto_video_stabilizer::signal::setup_shutdown_signal;
use console::{Term, style};
use log::{info, warn};

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal();

    let mut config = Config::new();
    rust_i18n::set_locale(config.settings.language.as_str());

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(goodbye_message()).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {e:#}", style("Error:").red().bold());
                break;
            }
        }
    }

    Ok(())
}
