use crate::config::save::save_settings;
use crate::config::types::{Config, Language, PipelineConfig};
use crate::menu::handlers::{run_stabilize_local, run_stabilize_url, run_tool_check};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_local"),
        t!("main_menu.opt_url"),
        t!("main_menu.opt_tools"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_stabilize_local(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_stabilize_url(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            run_tool_check(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(3) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(4) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_pipeline"),
            t!("settings.opt_bot"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_pipeline_settings_menu(term, config)?,
            Some(1) => show_bot_settings_menu(term, config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 穩定化參數設定
fn show_pipeline_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.pipeline.title")).cyan().bold());

    let current = &config.settings.pipeline;
    let theme = ColorfulTheme::default();

    let video_scale_factor: f64 = Input::with_theme(&theme)
        .with_prompt(t!("settings.pipeline.scale"))
        .default(current.video_scale_factor)
        .interact_text_on(term)?;
    let video_zoom_factor: f64 = Input::with_theme(&theme)
        .with_prompt(t!("settings.pipeline.zoom"))
        .default(current.video_zoom_factor)
        .interact_text_on(term)?;
    let min_video_length_seconds: f64 = Input::with_theme(&theme)
        .with_prompt(t!("settings.pipeline.min_duration"))
        .default(current.min_video_length_seconds)
        .interact_text_on(term)?;
    let max_video_length_seconds: f64 = Input::with_theme(&theme)
        .with_prompt(t!("settings.pipeline.max_duration"))
        .default(current.max_video_length_seconds)
        .interact_text_on(term)?;

    let candidate = PipelineConfig {
        video_scale_factor,
        video_zoom_factor,
        min_video_length_seconds,
        max_video_length_seconds,
        ..current.clone()
    };

    if let Err(e) = candidate.validate() {
        println!("\n{} {e}", style(t!("common.error_prefix")).red().bold());
        std::thread::sleep(Duration::from_secs(2));
        return Ok(());
    }

    if candidate != config.settings.pipeline {
        config.settings.pipeline = candidate;
        save_settings(&config.settings)?;
        println!("\n{}", style(t!("settings.saved")).green());
        std::thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}

/// 機器人設定
fn show_bot_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.bot.title")).cyan().bold());

    let theme = ColorfulTheme::default();

    let command_prefix: String = Input::with_theme(&theme)
        .with_prompt(t!("settings.bot.prefix"))
        .default(config.settings.bot.command_prefix.clone())
        .interact_text_on(term)?;
    let working_directory: String = Input::with_theme(&theme)
        .with_prompt(t!("settings.bot.working_directory"))
        .default(
            config
                .settings
                .pipeline
                .working_directory
                .display()
                .to_string(),
        )
        .interact_text_on(term)?;
    let downloader_path: String = Input::with_theme(&theme)
        .with_prompt(t!("settings.bot.downloader"))
        .default(config.settings.bot.downloader_path.display().to_string())
        .interact_text_on(term)?;

    let mut settings = config.settings.clone();
    settings.bot.command_prefix = command_prefix.trim().to_string();
    settings.bot.downloader_path = PathBuf::from(downloader_path.trim());
    settings.pipeline.working_directory = PathBuf::from(working_directory.trim());

    if settings != config.settings {
        config.settings = settings;
        save_settings(&config.settings)?;
        println!("\n{}", style(t!("settings.saved")).green());
        std::thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}

/// 離開時的訊息
pub fn goodbye_message() -> String {
    t!("main_menu.goodbye").to_string()
}
