// ============================================================================
// PNGEditor CLI: headless batch editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   PNGEditor --input photo.png --invert --output result.png
//   PNGEditor -i scan.png --grayscale --sharpen          (writes scan_out.png)
//   PNGEditor -i "shots/*.png" --blur --red 0.5 --output-dir processed/
//   PNGEditor -i a.png b.png --rotate 90 --output-dir out/ --format jpeg
//
// No window is opened in CLI mode. Each file runs through the same edit
// pipeline the GUI uses, one file at a time.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::ops::pipeline::EditState;
use crate::project::Document;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PNGEditor headless image processor.
#[derive(Parser, Debug)]
#[command(
    name = "PNGEditor",
    about = "PNGEditor headless batch image processor",
    long_about = "Apply the editor's adjustments to image files without opening the GUI.\n\
                  Edits always run in a fixed order: invert, grayscale, blur, sharpen,\n\
                  channel scale, rotate.\n\n\
                  Example:\n  \
                  PNGEditor --input photo.png --invert --output result.png\n  \
                  PNGEditor -i *.png --grayscale --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp, tga, tiff.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Invert RGB channels.
    #[arg(long)]
    pub invert: bool,

    /// Convert to grayscale (channel average).
    #[arg(long)]
    pub grayscale: bool,

    /// 3x3 box blur.
    #[arg(long)]
    pub blur: bool,

    /// 3x3 sharpen.
    #[arg(long)]
    pub sharpen: bool,

    /// Red channel scale (0.0 to 1.0).
    #[arg(long, default_value_t = 1.0, value_name = "0-1")]
    pub red: f32,

    /// Green channel scale (0.0 to 1.0).
    #[arg(long, default_value_t = 1.0, value_name = "0-1")]
    pub green: f32,

    /// Blue channel scale (0.0 to 1.0).
    #[arg(long, default_value_t = 1.0, value_name = "0-1")]
    pub blue: f32,

    /// Rotation in degrees, clockwise (-180 to 180). The canvas keeps its size.
    #[arg(long, default_value_t = 0.0, value_name = "DEG", allow_negative_numbers = true)]
    pub rotate: f32,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        Self::requests_cli(std::env::args().skip(1))
    }

    /// Whether `args` (program name excluded) carry an input flag in any of
    /// the forms clap accepts: `-i x`, `-ix`, `-i=x`, `--input x`, `--input=x`.
    pub fn requests_cli<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter().any(|a| {
            let a = a.as_ref();
            if let Some(long) = a.strip_prefix("--") {
                long == "input" || long.starts_with("input=")
            } else if let Some(shorts) = a.strip_prefix('-') {
                short_cluster_has_input(shorts)
            } else {
                false
            }
        })
    }

    /// The edit state these flags describe, clamped to the valid ranges.
    pub fn edit_state(&self) -> EditState {
        EditState {
            invert: self.invert,
            grayscale: self.grayscale,
            blur: self.blur,
            sharpen: self.sharpen,
            red_scale: self.red,
            green_scale: self.green,
            blue_scale: self.blue,
            rotation_degrees: self.rotate,
        }
        .clamped()
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let extension = output_extension(args.format.as_deref(), args.output.as_deref());
    let edits = args.edit_state();
    if args.verbose {
        println!("edits: {}", edits.summary());
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let output_path = match build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            &extension,
        ) {
            Some(p) => p,
            None => {
                eprintln!(
                    "  error: cannot determine output path for '{}'.",
                    input_path.display()
                );
                any_failure = true;
                continue;
            }
        };

        match run_one(input_path, &output_path, edits) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  -> {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing
// ============================================================================

fn run_one(input: &Path, output: &Path, edits: EditState) -> Result<(), String> {
    let mut document = Document::open(input).map_err(|e| format!("load failed: {}", e))?;
    document.set_edits(edits);
    document
        .save_as(output)
        .map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Walk a short-flag cluster (`vi`, `ifoo.png`) the way clap does: `-v` takes
/// no value, anything else that takes one (`-o`, `-f`) ends the cluster.
fn short_cluster_has_input(shorts: &str) -> bool {
    for c in shorts.chars() {
        match c {
            'i' => return true,
            'v' => continue,
            _ => return false,
        }
    }
    false
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Pick the output extension from `--format`, else `--output`'s extension,
/// else png.
fn output_extension(format_arg: Option<&str>, output: Option<&Path>) -> String {
    let from_arg = format_arg.map(|f| match f.to_lowercase().as_str() {
        "jpeg" | "jpg" => "jpg".to_string(),
        "tif" => "tiff".to_string(),
        other => other.to_string(),
    });
    from_arg
        .or_else(|| {
            output
                .and_then(|p| p.extension())
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
        })
        .unwrap_or_else(|| "png".to_string())
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    ext: &str,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    // Never overwrite the input in place
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("PNGEditor").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_are_identity() {
        let args = parse(&["-i", "a.png"]);
        assert!(args.edit_state().is_identity());
        assert_eq!(args.input, vec!["a.png".to_string()]);
    }

    #[test]
    fn flags_map_onto_edit_state() {
        let args = parse(&[
            "-i", "a.png", "--invert", "--blur", "--red", "0.25", "--rotate", "-90",
        ]);
        let edits = args.edit_state();
        assert!(edits.invert && edits.blur);
        assert!(!edits.grayscale && !edits.sharpen);
        assert_eq!(edits.red_scale, 0.25);
        assert_eq!(edits.rotation_degrees, -90.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let args = parse(&["-i", "a.png", "--green", "4", "--rotate", "720"]);
        let edits = args.edit_state();
        assert_eq!(edits.green_scale, 1.0);
        assert_eq!(edits.rotation_degrees, 180.0);
    }

    #[test]
    fn cli_mode_detects_every_input_spelling() {
        for args in [
            &["-i", "a.png"][..],
            &["--input", "a.png"],
            &["--input=a.png", "--invert"],
            &["--blur", "-ia.png"],
            &["-i=a.png"],
            &["-vi", "a.png"],
        ] {
            assert!(CliArgs::requests_cli(args), "{:?}", args);
            assert!(CliArgs::try_parse_from(std::iter::once("PNGEditor").chain(args.iter().copied())).is_ok());
        }
    }

    #[test]
    fn gui_launches_without_input_flags() {
        assert!(!CliArgs::requests_cli(Vec::<String>::new()));
        assert!(!CliArgs::requests_cli(["photo.png"]));
        assert!(!CliArgs::requests_cli(["--invert", "--inputs"]));
        assert!(!CliArgs::requests_cli(["-fgif", "-o", "x.png"]));
        assert!(!CliArgs::requests_cli(["--rotate", "-90"]));
    }

    #[test]
    fn input_is_required() {
        assert!(CliArgs::try_parse_from(["PNGEditor", "--invert"]).is_err());
    }

    #[test]
    fn several_inputs_after_one_flag() {
        let args = parse(&["-i", "a.png", "b.png", "c.png"]);
        assert_eq!(args.input.len(), 3);
    }

    #[test]
    fn extension_resolution() {
        assert_eq!(output_extension(Some("JPEG"), None), "jpg");
        assert_eq!(output_extension(None, Some(Path::new("out/x.WebP"))), "webp");
        assert_eq!(output_extension(None, None), "png");
        assert_eq!(output_extension(Some("bmp"), Some(Path::new("x.png"))), "bmp");
    }

    #[test]
    fn output_path_priority() {
        let input = Path::new("shots/cat.png");
        assert_eq!(
            build_output_path(input, Some(Path::new("x.png")), None, "png"),
            Some(PathBuf::from("x.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out")), "jpg"),
            Some(PathBuf::from("out").join("cat.jpg"))
        );
        assert_eq!(
            build_output_path(input, None, None, "jpg"),
            Some(PathBuf::from("shots").join("cat.jpg"))
        );
    }

    #[test]
    fn output_never_overwrites_input() {
        let input = Path::new("shots/cat.png");
        assert_eq!(
            build_output_path(input, None, None, "png"),
            Some(PathBuf::from("shots").join("cat_out.png"))
        );
    }
}
