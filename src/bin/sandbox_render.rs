use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use graphular::api::{Attributes, ChartHost, DirectiveBindings, RenderOutcome};
use graphular::core::{Dataset, ElementBox, OptionMap};
use graphular::render::{SceneGraphics, SvgMarkupRenderer};
use graphular::telemetry::init_default_tracing;

const DEFAULT_DATA: &str = r#"[{"label":"A","value":40},{"label":"B","value":90}]"#;

#[derive(Debug)]
struct CliArgs {
    chart_type: String,
    data: Option<PathBuf>,
    options: Option<PathBuf>,
    width: f64,
    height: f64,
    attributes: Vec<(String, String)>,
    output: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let _ = init_default_tracing();
    let args = parse_args()?;

    let raw_data = match &args.data {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?,
        None => DEFAULT_DATA.to_owned(),
    };
    let dataset = Dataset::from_json_str(&raw_data).map_err(|err| err.to_string())?;

    let mut bindings = DirectiveBindings::new(Attributes::from_markup(args.attributes))
        .with_data(Rc::new(dataset));
    if let Some(path) = &args.options {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
        let options: OptionMap = serde_json::from_str(&raw)
            .map_err(|err| format!("failed to parse options `{}`: {err}", path.display()))?;
        bindings = bindings.with_options(options);
    }

    let host = ChartHost::builder()
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .map_err(|err| err.to_string())?;
    let container = Rc::new(ElementBox::new(args.width, args.height));
    let mut directive = host
        .attach_with_renderer(
            container,
            &args.chart_type,
            bindings,
            SvgMarkupRenderer::default(),
        )
        .map_err(|err| err.to_string())?;

    let outcome = directive.flush().map_err(|err| err.to_string())?;
    directive.chart_mut().state_mut().svg_mut().finish_transitions();
    let markup = directive.chart().state().svg().to_svg_markup();

    match &args.output {
        Some(path) => fs::write(path, &markup)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?,
        None => println!("{markup}"),
    }
    if let RenderOutcome::Drawn { node_count } = outcome {
        eprintln!("rendered `{}` with {node_count} nodes", args.chart_type);
    }
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs {
        chart_type: "bar".to_owned(),
        data: None,
        options: None,
        width: 600.0,
        height: 400.0,
        attributes: Vec::new(),
        output: None,
    };

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for `{flag}`"))
        };
        match flag.as_str() {
            "--type" => parsed.chart_type = value()?,
            "--data" => parsed.data = Some(PathBuf::from(value()?)),
            "--options" => parsed.options = Some(PathBuf::from(value()?)),
            "--width" => parsed.width = parse_px(&value()?)?,
            "--height" => parsed.height = parse_px(&value()?)?,
            "--attr" => {
                let pair = value()?;
                let (name, attr) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("attribute `{pair}` must look like name=value"))?;
                parsed.attributes.push((name.to_owned(), attr.to_owned()));
            }
            "--output" => parsed.output = Some(PathBuf::from(value()?)),
            "--help" | "-h" => {
                return Err(
                    "usage: sandbox_render [--type <id>] [--data <json>] [--options <json>] [--width <px>] [--height <px>] [--attr name=value]... [--output <path>]"
                        .to_owned(),
                );
            }
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }
    Ok(parsed)
}

fn parse_px(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|px| px.is_finite() && *px >= 0.0)
        .ok_or_else(|| format!("`{raw}` is not a valid pixel size"))
}
