// PNGEditor entry point.
// • CLI mode (--input/-i flag present): batch-process files and exit.
// • GUI mode: open the editor window.
use eframe::egui;
use pngeditor::app::PNGEditorApp;
use pngeditor::settings::AppSettings;
use pngeditor::{cli, logger};

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let settings = AppSettings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_maximized(settings.start_maximized)
            .with_title("PNGEditor"),
        ..Default::default()
    };

    eframe::run_native(
        "PNGEditor",
        options,
        Box::new(|cc| Box::new(PNGEditorApp::new(cc, settings))),
    )
}
