//! Command-line driver: reads MathML (or LaTeX, when a converter is
//! compiled in) from a file or stdin and writes a standalone SVG.
//!
//! Exit codes: 0 success, 1 parse error, 2 I/O error, 3 font error.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mathsvg::error::Error;
use mathsvg::font::backend::ttf_parser::MathFace;
use mathsvg::font::FontContext;
use mathsvg::{render_mathml_with, RenderOptions};

#[derive(Parser)]
#[command(name = "mathsvg", version, about = "Render MathML math to standalone SVG")]
struct Args {
    /// Treat the input as LaTeX math (requires a LaTeX converter).
    #[arg(long)]
    latex: bool,

    /// Treat the input as MathML (the default).
    #[arg(long)]
    mathml: bool,

    /// Render in inline (text) style instead of display style.
    #[arg(long)]
    inline: bool,

    /// Path to an OpenType font with a MATH table. Falls back to the
    /// configured math font.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input path, or `-` for stdin.
    input: Option<String>,
}

const EXIT_PARSE: u8 = 1;
const EXIT_IO: u8 = 2;
const EXIT_FONT: u8 = 3;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(args: &Args) -> Result<(), u8> {
    if args.latex && args.mathml {
        eprintln!("mathsvg: --latex and --mathml are mutually exclusive");
        return Err(EXIT_PARSE);
    }

    let source = read_input(args)?;

    if args.latex {
        // The LaTeX front-end is an external collaborator; none is linked
        // into the standalone binary.
        eprintln!("mathsvg: {}", Error::Parse(mathsvg::error::ParseError::LatexUnavailable));
        return Err(EXIT_PARSE);
    }

    let font_path = args
        .font
        .clone()
        .or_else(|| mathsvg::config::snapshot().math.mathfont)
        .ok_or_else(|| {
            eprintln!("mathsvg: no math font given (use --font or configure math.mathfont)");
            EXIT_FONT
        })?;
    let font_data = std::fs::read(&font_path).map_err(|e| {
        eprintln!("mathsvg: cannot read font {}: {}", font_path.display(), e);
        EXIT_IO
    })?;
    let face = MathFace::parse(&font_data).map_err(|e| {
        eprintln!("mathsvg: {}", e);
        EXIT_FONT
    })?;
    let ctx = FontContext::new(&face).map_err(|e| {
        eprintln!("mathsvg: {}", e);
        EXIT_FONT
    })?;

    let options = RenderOptions {
        display: if args.inline { Some(false) } else { None },
        number: None,
    };
    let svg = render_mathml_with(&source, &ctx, &options).map_err(|e| {
        eprintln!("mathsvg: {}", e);
        match e {
            Error::Parse(_) | Error::Config(_) => EXIT_PARSE,
            Error::Font(_) | Error::Layout(_) => EXIT_FONT,
        }
    })?;

    match &args.output {
        Some(path) => std::fs::write(path, svg).map_err(|e| {
            eprintln!("mathsvg: cannot write {}: {}", path.display(), e);
            EXIT_IO
        }),
        None => {
            println!("{}", svg);
            Ok(())
        }
    }
}

fn read_input(args: &Args) -> Result<String, u8> {
    match args.input.as_deref() {
        None | Some("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
                eprintln!("mathsvg: cannot read stdin: {}", e);
                EXIT_IO
            })?;
            Ok(buffer)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            eprintln!("mathsvg: cannot read {}: {}", path, e);
            EXIT_IO
        }),
    }
}
