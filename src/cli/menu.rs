use anyhow::{bail, Result};
use log::{debug, trace};

use super::UserPort;

/// Anything a menu can run against: it must expose the port to prompt on
pub trait MenuHost {
    fn port(&mut self) -> &mut dyn UserPort;
}

type MenuAction<'a, C, R> = Box<dyn FnMut(&mut C) -> Result<R> + 'a>;

/// One numbered entry of a menu
pub struct MenuOption<'a, C, R> {
    pub label: String,
    action: MenuAction<'a, C, R>,
}

impl<'a, C, R> MenuOption<'a, C, R> {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut C) -> Result<R> + 'a,
    {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }
}

/// The option the user picked (1-based) and what its action returned
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSelection<R> {
    pub choice: usize,
    pub value: R,
}

enum MenuState<R> {
    Prompting,
    Dispatching(usize),
    Done(MenuSelection<R>),
}

/// Show `intro` and the numbered options, read a choice until it is valid,
/// then run the chosen action and hand back its result.
pub fn run_menu<C, R>(
    host: &mut C,
    options: &mut [MenuOption<'_, C, R>],
    intro: &str,
) -> Result<MenuSelection<R>>
where
    C: MenuHost,
{
    if options.is_empty() {
        bail!("Cannot run a menu without options");
    }

    let message = render(options, intro);
    let mut state = MenuState::Prompting;

    loop {
        state = match state {
            MenuState::Prompting => {
                let input = host.port().prompt(&message, None)?;
                match parse_choice(input.as_deref(), options.len()) {
                    Some(choice) => MenuState::Dispatching(choice),
                    None => {
                        debug!("Rejected menu input {:?}", input);
                        MenuState::Prompting
                    }
                }
            }
            MenuState::Dispatching(choice) => {
                trace!("Dispatching menu option {}", choice);
                let value = (options[choice - 1].action)(host)?;
                MenuState::Done(MenuSelection { choice, value })
            }
            MenuState::Done(selection) => return Ok(selection),
        };
    }
}

fn render<C, R>(options: &[MenuOption<'_, C, R>], intro: &str) -> String {
    let mut message = format!("{}Choose one of the following:\n", intro);
    for (index, option) in options.iter().enumerate() {
        message.push_str(&format!("{}) {}\n", index + 1, option.label));
    }
    message
}

fn parse_choice(input: Option<&str>, count: usize) -> Option<usize> {
    let choice = input?.trim().parse::<usize>().ok()?;
    (1..=count).contains(&choice).then_some(choice)
}

/// A titled list of options, built fresh for every display
pub struct Menu<'a, C, R> {
    intro: String,
    options: Vec<MenuOption<'a, C, R>>,
}

impl<'a, C: MenuHost, R> Menu<'a, C, R> {
    pub fn new(intro: impl Into<String>) -> Self {
        Self {
            intro: intro.into(),
            options: Vec::new(),
        }
    }

    pub fn option<F>(mut self, label: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut C) -> Result<R> + 'a,
    {
        self.options.push(MenuOption::new(label, action));
        self
    }

    pub fn run(&mut self, host: &mut C) -> Result<MenuSelection<R>> {
        run_menu(host, &mut self.options, &self.intro)
    }
}

/// Rebuild and run a menu until an action returns `sentinel`.
///
/// Returns how many times the menu was shown.
pub fn repeat_until<'a, C, R, F>(host: &mut C, sentinel: &R, mut build: F) -> Result<usize>
where
    C: MenuHost,
    R: PartialEq,
    F: FnMut(&C) -> Menu<'a, C, R>,
{
    let mut rounds = 0;
    loop {
        let mut menu = build(&*host);
        let selection = menu.run(host)?;
        rounds += 1;

        if selection.value == *sentinel {
            return Ok(rounds);
        }
    }
}
