use crate::{
    config::SimulationConfig,
    distance::Point,
    error::{Error, Result},
    simulation::Simulation,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A typed simulation command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Reset,
    Scatter { num: usize, loc: Point, scale: f64 },
    Meteor { size: f64, loc: Point },
    Meteors { size: f64, num: usize },
    MakePlots { node_range: f64 },
}

/// What a command did to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Reset,
    Scattered { nodes: usize },
    Destroyed { nodes: usize },
    Connectivity { connected: usize, disconnected: usize },
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Reset => "reset",
            Command::Scatter { .. } => "scatter",
            Command::Meteor { .. } => "meteor",
            Command::Meteors { .. } => "meteors",
            Command::MakePlots { .. } => "make_plots",
        }
    }

    /// # Errors
    ///
    /// Propagates the error of the simulation operation.
    pub fn execute(&self, sim: &mut Simulation) -> Result<Outcome> {
        match *self {
            Command::Reset => {
                sim.reset();
                Ok(Outcome::Reset)
            }
            Command::Scatter { num, loc, scale } => sim
                .scatter(num, loc, scale)
                .map(|nodes| Outcome::Scattered { nodes }),
            Command::Meteor { size, loc } => sim
                .meteor(size, loc)
                .map(|nodes| Outcome::Destroyed { nodes }),
            Command::Meteors { size, num } => sim
                .meteors(size, num)
                .map(|nodes| Outcome::Destroyed { nodes }),
            Command::MakePlots { node_range } => {
                let reachability = sim.make_graph(node_range)?;
                Ok(Outcome::Connectivity {
                    connected: reachability.num_connected(),
                    disconnected: reachability.num_disconnected(),
                })
            }
        }
    }
}

/// Values of one command line, keyed by parameter name.
pub struct Arguments<'a> {
    command: &'static str,
    values: HashMap<&'static str, &'a str>,
}

impl<'a> Arguments<'a> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the value is not a count.
    pub fn count(&self, name: &'static str) -> Result<Option<usize>> {
        self.values
            .get(name)
            .map(|value| {
                value
                    .parse::<usize>()
                    .map_err(|_| self.malformed(name, "a count", value))
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the value is not a number.
    pub fn number(&self, name: &'static str) -> Result<Option<f64>> {
        self.values
            .get(name)
            .map(|value| {
                value
                    .parse::<f64>()
                    .map_err(|_| self.malformed(name, "a number", value))
            })
            .transpose()
    }

    /// Points are written `x,y`, optionally in parentheses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the value is not a point.
    pub fn point(&self, name: &'static str) -> Result<Option<Point>> {
        let Some(value) = self.values.get(name) else {
            return Ok(None);
        };
        let inner = value.trim_start_matches('(').trim_end_matches(')');
        let parsed = inner.split_once(',').and_then(|(x, y)| {
            let x = x.trim().parse::<f64>().ok()?;
            let y = y.trim().parse::<f64>().ok()?;
            Some([x, y])
        });
        parsed
            .map(Some)
            .ok_or_else(|| self.malformed(name, "a point `x,y`", value))
    }

    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] when `value` is `None`.
    pub fn required<T>(&self, name: &'static str, value: Option<T>) -> Result<T> {
        value.ok_or(Error::MissingParameter {
            command: self.command,
            parameter: name,
        })
    }

    fn malformed(&self, name: &str, expected: &str, value: &str) -> Error {
        Error::invalid(format!(
            "{}: `{name}` expects {expected}, got `{value}`",
            self.command
        ))
    }
}

type Parser = fn(&Arguments<'_>, &SimulationConfig) -> Result<Command>;

/// A registered command: its name, its parameters in positional order and
/// the parser producing the typed [`Command`].
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub params: &'static [&'static str],
    parse: Parser,
}

/// Fixed table of the commands a script or console may issue.
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandSpec>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = CommandRegistry {
            commands: HashMap::new(),
        };
        registry.register("reset", &[], |_, _| Ok(Command::Reset));
        registry.register("scatter", &["num", "loc", "scale"], parse_scatter);
        registry.register("meteor", &["size", "loc"], parse_meteor);
        registry.register("meteors", &["size", "num"], parse_meteors);
        registry.register("make_plots", &["node_range"], parse_make_plots);
        registry
    }

    fn register(&mut self, name: &'static str, params: &'static [&'static str], parse: Parser) {
        self.commands.insert(
            name,
            CommandSpec {
                name,
                params,
                parse,
            },
        );
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.commands.keys().copied().collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Parses `name arg...` where each argument is `key=value` or a value
    /// bound to the next parameter in order. A parenthesized point such as
    /// `(0, 0)` stays one argument. Blank lines and `#` comments yield `None`;
    /// defaults come from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCommand`], [`Error::MissingParameter`] or
    /// [`Error::InvalidArgument`] for a line that does not describe a command.
    pub fn parse(&self, line: &str, config: &SimulationConfig) -> Result<Option<Command>> {
        let line = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };
        let mut tokens = tokenize(line).into_iter();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let spec = self
            .get(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))?;

        let mut values = HashMap::new();
        let mut positional = 0;
        for token in tokens {
            let (param, value) = match token.split_once('=') {
                Some((key, value)) => {
                    let param = spec
                        .params
                        .iter()
                        .find(|&&param| param == key)
                        .ok_or_else(|| {
                            Error::invalid(format!("{}: unknown parameter `{key}`", spec.name))
                        })?;
                    (*param, value)
                }
                None => {
                    let param = spec.params.get(positional).ok_or_else(|| {
                        Error::invalid(format!("{}: too many arguments", spec.name))
                    })?;
                    positional += 1;
                    (*param, token)
                }
            };
            if values.insert(param, value).is_some() {
                return Err(Error::invalid(format!(
                    "{}: `{param}` given twice",
                    spec.name
                )));
            }
        }

        let arguments = Arguments {
            command: spec.name,
            values,
        };
        (spec.parse)(&arguments, config).map(Some)
    }

    /// Runs every command of `script` in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the parse or execution error of the failing line.
    pub fn run_script(&self, sim: &mut Simulation, script: &str) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::new();
        for (number, line) in script.lines().enumerate() {
            let result = self
                .parse(line, sim.config())
                .and_then(|command| command.map(|command| command.execute(sim)).transpose());
            match result {
                Ok(Some(outcome)) => {
                    debug!(line = number + 1, ?outcome, "script step");
                    outcomes.push(outcome);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(line = number + 1, %error, "script stopped");
                    return Err(error);
                }
            }
        }
        Ok(outcomes)
    }
}

fn parse_scatter(args: &Arguments<'_>, config: &SimulationConfig) -> Result<Command> {
    Ok(Command::Scatter {
        num: args.required("num", args.count("num")?)?,
        loc: args.point("loc")?.unwrap_or(config.location),
        scale: args.number("scale")?.unwrap_or(config.scale),
    })
}

fn parse_meteor(args: &Arguments<'_>, config: &SimulationConfig) -> Result<Command> {
    Ok(Command::Meteor {
        size: args.required("size", args.number("size")?)?,
        loc: args.point("loc")?.unwrap_or(config.location),
    })
}

fn parse_meteors(args: &Arguments<'_>, _: &SimulationConfig) -> Result<Command> {
    Ok(Command::Meteors {
        size: args.required("size", args.number("size")?)?,
        num: args.required("num", args.count("num")?)?,
    })
}

fn parse_make_plots(args: &Arguments<'_>, config: &SimulationConfig) -> Result<Command> {
    Ok(Command::MakePlots {
        node_range: args.number("node_range")?.unwrap_or(config.node_range),
    })
}

/// Splits on whitespace outside parentheses.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&line[begin..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(begin) = start {
        tokens.push(&line[begin..]);
    }
    tokens
}
