//! Command-line interface for cryptobib
//!
//! Usage:
//!   cryptobib fmt `<file>` [--in-place]                      - Print or rewrite a bibyml file with aligned values
//!   cryptobib convert `<file>` [--format json|yaml]          - Dump a bibyml file as json or yaml
//!   cryptobib key `<key>`...                                 - Decode entry keys
//!   cryptobib sort --confs `<bibyml>` --entries `<json>` ... - Sort entries and render them as bibtex
//!   cryptobib years --confs `<bibyml>` --entries `<json>`    - List the years covered by each conference
//!
//! Every command accepts `--config <toml>` to layer a configuration file over the defaults.
//! Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use cryptobib::bib::bibtex::{BibtexOptions, BibtexWriter};
use cryptobib::bib::confs_years::{confs_years, confs_years_intervals};
use cryptobib::bib::years::{parse_year_ranges, ConfYearBounds};
use cryptobib::bib::{
    ConferenceRegistry, Database, EntryFilter, EntryKey, FilterAll, FilterConf, FilterPaper,
    OrderingContext, SortConfYearPage,
};
use cryptobib::bibyml::{self, BibYmlNode};
use cryptobib::settings::{Loader, Settings};
use std::collections::BTreeMap;
use std::error::Error;
use tracing_subscriber::EnvFilter;

type CliResult = Result<String, Box<dyn Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let settings = load_settings(matches.get_one::<String>("config")).unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        std::process::exit(1);
    });

    let output = match matches.subcommand() {
        Some(("fmt", sub)) => handle_fmt_command(sub, &settings),
        Some(("convert", sub)) => handle_convert_command(sub),
        Some(("key", sub)) => handle_key_command(sub, &settings),
        Some(("sort", sub)) => handle_sort_command(sub, &settings),
        Some(("years", sub)) => handle_years_command(sub, &settings),
        _ => unreachable!(),
    };

    match output {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn cli() -> Command {
    let file_arg = || {
        Arg::new("path")
            .help("Path to the bibyml file")
            .required(true)
            .index(1)
    };
    let confs_arg = || {
        Arg::new("confs")
            .long("confs")
            .help("Conference registry (bibyml)")
            .required(true)
    };
    let entries_arg = || {
        Arg::new("entries")
            .long("entries")
            .help("Bibliography entries (json)")
            .required(true)
    };

    Command::new("cryptobib")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tools for the cryptography bibliography")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .subcommand(
            Command::new("fmt")
                .about("Align a bibyml file with the configured layout")
                .arg(file_arg())
                .arg(
                    Arg::new("in-place")
                        .long("in-place")
                        .short('i')
                        .help("Rewrite the file instead of printing it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Dump a bibyml file in another format")
                .arg(file_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("key").about("Decode entry keys").arg(
                Arg::new("keys")
                    .help("Entry keys, e.g. EC15 or C:Smith99a")
                    .required(true)
                    .num_args(1..),
            ),
        )
        .subcommand(
            Command::new("sort")
                .about("Sort entries and render them as bibtex")
                .arg(confs_arg())
                .arg(entries_arg())
                .arg(
                    Arg::new("conf")
                        .long("conf")
                        .help("Only keep entries of this confkey"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Keep proceedings volumes, not only papers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("expand-crossrefs")
                        .long("expand-crossrefs")
                        .help("Merge the fields of crossref targets into the entries")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("include-crossrefs")
                        .long("include-crossrefs")
                        .help("Append the crossref targets after the entries")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("remove-empty-fields")
                        .long("remove-empty-fields")
                        .help("Skip fields with an empty value")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("years")
                .about("List the years covered by each conference")
                .arg(confs_arg())
                .arg(entries_arg())
                .arg(
                    Arg::new("select")
                        .long("select")
                        .help("Year range query, e.g. EC=2010-2015")
                        .action(ArgAction::Append),
                ),
        )
}

fn load_settings(config: Option<&String>) -> Result<Settings, config::ConfigError> {
    let mut loader = Loader::from_defaults();
    if let Some(path) = config {
        loader = loader.with_file(path);
    }
    loader.build()
}

fn read_file(path: &str) -> Result<String, Box<dyn Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e).into())
}

fn read_bibyml(path: &str) -> Result<BibYmlNode, Box<dyn Error>> {
    Ok(bibyml::parse(&read_file(path)?)?)
}

fn read_inputs(matches: &ArgMatches) -> Result<(ConferenceRegistry, Database), Box<dyn Error>> {
    let confs = matches
        .get_one::<String>("confs")
        .expect("confs is required");
    let entries = matches
        .get_one::<String>("entries")
        .expect("entries is required");
    let registry = ConferenceRegistry::from_bibyml(&read_bibyml(confs)?)?;
    let database = Database::from_json(&read_file(entries)?)?;
    Ok((registry, database))
}

fn handle_fmt_command(matches: &ArgMatches, settings: &Settings) -> CliResult {
    let path = matches.get_one::<String>("path").expect("path is required");
    let tree = read_bibyml(path)?;
    let output = bibyml::write_str(&tree, &settings.bibyml);
    if !matches.get_flag("in-place") {
        return Ok(output);
    }
    std::fs::write(path, output).map_err(|e| format!("cannot write {}: {}", path, e))?;
    Ok(String::new())
}

fn handle_convert_command(matches: &ArgMatches) -> CliResult {
    let path = matches.get_one::<String>("path").expect("path is required");
    let format = matches
        .get_one::<String>("format")
        .expect("format has a default");
    let tree = read_bibyml(path)?;
    let output = match format.as_str() {
        "yaml" => serde_yaml::to_string(&tree)?,
        _ => serde_json::to_string_pretty(&tree)? + "\n",
    };
    Ok(output)
}

/// Decoded keys are printed as bibyml documents, one per key
fn handle_key_command(matches: &ArgMatches, settings: &Settings) -> CliResult {
    let mut documents = Vec::new();
    for raw in matches.get_many::<String>("keys").into_iter().flatten() {
        let key = EntryKey::parse(raw)?;
        let mut fields = BibYmlNode::with_value(key.to_string())
            .child("confkey", BibYmlNode::with_value(key.confkey.clone()))
            .child(
                "kind",
                BibYmlNode::with_value(if key.is_paper() { "paper" } else { "proceedings" }),
            );
        if let Some(auth) = &key.auth {
            fields = fields.child("auth", BibYmlNode::with_value(auth.clone()));
        }
        fields = fields.child(
            "year",
            BibYmlNode::with_value(settings.years.short_to_full(key.year).to_string()),
        );
        if !key.dis.is_empty() {
            fields = fields.child("dis", BibYmlNode::with_value(key.dis.clone()));
        }
        let document = BibYmlNode::new().child("key", fields);
        documents.push(bibyml::write_str(&document, &settings.bibyml));
    }
    Ok(documents.join("\n"))
}

fn handle_sort_command(matches: &ArgMatches, settings: &Settings) -> CliResult {
    let (registry, database) = read_inputs(matches)?;
    let options = BibtexOptions {
        expand_crossrefs: matches.get_flag("expand-crossrefs"),
        include_crossrefs: matches.get_flag("include-crossrefs"),
        remove_empty_fields: matches.get_flag("remove-empty-fields"),
    };
    if options.expand_crossrefs || options.include_crossrefs {
        database.check_crossrefs()?;
    }

    let all = matches.get_flag("all");
    let filter: Box<dyn EntryFilter> = match matches.get_one::<String>("conf") {
        Some(conf) if all => Box::new(FilterConf::new(conf)),
        Some(conf) => Box::new(FilterConf::new(conf).and(FilterPaper)),
        None if all => Box::new(FilterAll),
        None => Box::new(FilterPaper),
    };
    let entries: Vec<_> = database
        .iter()
        .filter(|view| filter.is_selected(view.key))
        .collect();

    let context = OrderingContext {
        registry: &registry,
        years: settings.years,
    };
    let writer = BibtexWriter::new(&database, &settings.bibtex, options);
    Ok(writer.render(entries, &SortConfYearPage::new(context))?)
}

fn handle_years_command(matches: &ArgMatches, settings: &Settings) -> CliResult {
    let (registry, database) = read_inputs(matches)?;
    let intervals = confs_years_intervals(
        &confs_years(&database, settings.years),
        &registry.missing_years(),
    );

    let mut output = String::new();
    let queries: Vec<&String> = matches
        .get_many::<String>("select")
        .into_iter()
        .flatten()
        .collect();

    if queries.is_empty() {
        for (conf, (start, end)) in &intervals {
            output.push_str(&format!("{}: {}-{}\n", conf, start, end));
        }
        return Ok(output);
    }

    let mut query = BTreeMap::new();
    for raw in queries {
        let (conf, range) = raw
            .split_once('=')
            .ok_or_else(|| format!("invalid selection \"{}\", expected CONF=RANGE", raw))?;
        query.insert(conf.to_string(), range.to_string());
    }
    let bounds: Vec<ConfYearBounds> = intervals
        .iter()
        .map(|(conf, &(start_year, end_year))| ConfYearBounds {
            key: conf.clone(),
            start_year,
            end_year,
        })
        .collect();

    let selection = parse_year_ranges(&bounds, &query);
    for (conf, err) in &selection.errors {
        tracing::warn!(conference = %conf, "{}", err);
    }
    for (conf, (start, end)) in &selection.years {
        output.push_str(&format!("{}: {}-{}\n", conf, start, end));
    }
    output.push_str(&format!("{} conference(s) selected\n", selection.count()));
    Ok(output)
}
