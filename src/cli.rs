use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use orthoflow::{ChartDocument, LinkType, Router};

const DEFAULT_BACKGROUND: &str = "white";

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
enum OutputDestination {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Parser)]
#[command(
    name = "orthoflow",
    about = "Render JSON flowchart definitions to SVG with orthogonal connectors."
)]
pub struct RenderArgs {
    /// Path to the chart definition (JSON). Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Path to the output file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Background color for the rendered chart. Overrides the document's
    /// `background`; white when neither is set.
    #[arg(short = 'b', long = "background-color")]
    background_color: Option<String>,

    /// Connector router, overriding the document's choice.
    #[arg(long = "router", value_enum)]
    router: Option<RouterArg>,

    /// Default link type for edges that do not set one.
    #[arg(long = "link-type", value_enum)]
    link_type: Option<LinkTypeArg>,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum RouterArg {
    Polarity,
    Pattern,
}

impl From<RouterArg> for Router {
    fn from(value: RouterArg) -> Self {
        match value {
            RouterArg::Polarity => Router::Polarity,
            RouterArg::Pattern => Router::Pattern,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum LinkTypeArg {
    Normal,
    SourceBeam,
    TargetBeam,
}

impl From<LinkTypeArg> for LinkType {
    fn from(value: LinkTypeArg) -> Self {
        match value {
            LinkTypeArg::Normal => LinkType::Normal,
            LinkTypeArg::SourceBeam => LinkType::SourceBeam,
            LinkTypeArg::TargetBeam => LinkType::TargetBeam,
        }
    }
}

pub fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("render") => {
            let render_args = RenderArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_render(render_args)
        }
        _ => {
            let render_args = RenderArgs::parse_from(args);
            run_render(render_args)
        }
    }
}

fn run_render(cli: RenderArgs) -> Result<()> {
    let input_source = parse_input(cli.input.as_deref())?;
    let output_dest = parse_output(cli.output.as_deref(), &input_source)?;

    let definition = load_definition(&input_source)?;
    let mut document = ChartDocument::from_json(&definition)
        .with_context(|| format!("failed to parse chart from {}", describe(&input_source)))?;

    document.options.background = resolve_background(
        cli.background_color.as_deref(),
        document.options.background.as_deref(),
    );
    if let Some(router) = cli.router {
        document.options.router = router.into();
    }
    if let Some(link_type) = cli.link_type {
        document.options.link_type = link_type.into();
    }

    let svg = document
        .render_svg()
        .context("failed to render chart")?;

    write_output(output_dest, &svg, cli.quiet)?;

    Ok(())
}

fn describe(source: &InputSource) -> String {
    match source {
        InputSource::Stdin => "stdin".to_string(),
        InputSource::File(path) => format!("'{}'", path.display()),
    }
}

fn resolve_background(flag: Option<&str>, document: Option<&str>) -> Option<String> {
    Some(flag.or(document).unwrap_or(DEFAULT_BACKGROUND).to_string())
}

fn parse_input(input: Option<&str>) -> Result<InputSource> {
    let Some(path_str) = input.filter(|value| *value != "-") else {
        return Ok(InputSource::Stdin);
    };
    let path = PathBuf::from(path_str);
    if path.exists() {
        Ok(InputSource::File(path))
    } else {
        bail!("chart file '{path_str}' does not exist")
    }
}

fn parse_output(output: Option<&str>, input: &InputSource) -> Result<OutputDestination> {
    match output {
        Some("-") => Ok(OutputDestination::Stdout),
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(anyhow!(
                        "output directory '{}' does not exist",
                        parent.display()
                    ));
                }
            }
            Ok(OutputDestination::File(path))
        }
        None => match input {
            InputSource::File(path) => {
                let default_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| format!("{name}.svg"))
                    .unwrap_or_else(|| "out.svg".to_string());
                let mut default_path = path.to_path_buf();
                default_path.set_file_name(default_name);
                Ok(OutputDestination::File(default_path))
            }
            InputSource::Stdin => Ok(OutputDestination::Stdout),
        },
    }
}

fn load_definition(source: &InputSource) -> Result<String> {
    let definition = match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read chart from stdin")?;
            buffer
        }
        InputSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read chart '{}'", path.display()))?,
    };
    if definition.trim().is_empty() {
        bail!("chart definition from {} is empty", describe(source));
    }
    Ok(definition)
}

fn write_output(dest: OutputDestination, svg: &str, quiet: bool) -> Result<()> {
    match dest {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(svg.as_bytes())
                .context("failed to write svg to stdout")?;
            stdout.flush()?;
        }
        OutputDestination::File(path) => {
            fs::write(&path, svg)
                .with_context(|| format!("failed to write svg to '{}'", path.display()))?;
            if !quiet {
                println!("Generated chart -> {}", path.display());
            }
        }
    }
    Ok(())
}
