//! Interactive terminal front end.
//!
//! Reads one command per line from stdin, applies it to the mounted page
//! and prints the re-rendered screen. Auth changes made elsewhere (an
//! expired or revoked session) re-render the screen between commands.

use std::str::FromStr;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::layout::Link;
use crate::pages::Confirm;
use crate::router::{App, Navigation, Page, UnknownPage, View};

const HELP: &str = "\
Commands:
  go <page>                         home, signin, signup, dashboard, profile
  nav <n>                           follow a numbered link in the nav bar
  signout
  login <email> <password>          on the sign-in page
  register <email> <password> <display name>
  open <n>                          open a post from the list
  start                             get started from home
  blog new <title> | <description>
  blog select <n> | blog delete <n>
  post new | post edit <n> | post delete <n> | post publish <n>
  title <text> | excerpt <text> | write <line> | save | back
  bio <display name> | <bio>        on the profile page
  help | quit
";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Page(#[from] UnknownPage),

    #[error("No item {0} on this page")]
    NoSuchItem(usize),

    #[error("'{0}' is not available on this page")]
    Unavailable(&'static str),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Go(Page),
    SignOut,
    /// Zero-based index into the nav bar links.
    Nav(usize),
    SignIn { email: String, password: String },
    SignUp { email: String, password: String, display_name: String },
    /// Zero-based index into the visible list.
    Open(usize),
    GetStarted,
    NewBlog { title: String, description: String },
    SelectBlog(usize),
    DeleteBlog(usize),
    NewPost,
    EditPost(usize),
    DeletePost(usize),
    TogglePublish(usize),
    Title(String),
    Excerpt(String),
    Write(String),
    Save,
    Back,
    UpdateProfile { display_name: String, bio: String },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Quit => "quit",
            Command::Go(_) => "go",
            Command::SignOut => "signout",
            Command::Nav(_) => "nav",
            Command::SignIn { .. } => "login",
            Command::SignUp { .. } => "register",
            Command::Open(_) => "open",
            Command::GetStarted => "start",
            Command::NewBlog { .. } => "blog new",
            Command::SelectBlog(_) => "blog select",
            Command::DeleteBlog(_) => "blog delete",
            Command::NewPost => "post new",
            Command::EditPost(_) => "post edit",
            Command::DeletePost(_) => "post delete",
            Command::TogglePublish(_) => "post publish",
            Command::Title(_) => "title",
            Command::Excerpt(_) => "excerpt",
            Command::Write(_) => "write",
            Command::Save => "save",
            Command::Back => "back",
            Command::UpdateProfile { .. } => "bio",
        }
    }
}

/// Parse a one-based item number.
fn index(arg: &str, usage: &'static str) -> Result<usize, CommandError> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Split `left | right`.
fn pair<'a>(rest: &'a str, usage: &'static str) -> Result<(&'a str, &'a str), CommandError> {
    let (left, right) = rest.split_once('|').ok_or(CommandError::Usage(usage))?;
    Ok((left.trim(), right.trim()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "go" => Command::Go(rest.parse()?),
            "home" | "dashboard" | "profile" | "signin" | "signup" => Command::Go(word.parse()?),
            "signout" => Command::SignOut,
            "nav" => Command::Nav(index(rest, "nav <n>")?),
            "login" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next()) {
                    (Some(email), Some(password)) => Command::SignIn {
                        email: email.to_string(),
                        password: password.to_string(),
                    },
                    _ => return Err(CommandError::Usage("login <email> <password>")),
                }
            }
            "register" => {
                const USAGE: &str = "register <email> <password> <display name>";
                let mut args = rest.splitn(3, char::is_whitespace);
                match (args.next(), args.next(), args.next()) {
                    (Some(email), Some(password), Some(name)) if !email.is_empty() => {
                        Command::SignUp {
                            email: email.to_string(),
                            password: password.to_string(),
                            display_name: name.trim().to_string(),
                        }
                    }
                    _ => return Err(CommandError::Usage(USAGE)),
                }
            }
            "open" => Command::Open(index(rest, "open <n>")?),
            "start" => Command::GetStarted,
            "blog" => {
                let (sub, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match sub {
                    "new" => {
                        let (title, description) = pair(arg, "blog new <title> | <description>")?;
                        Command::NewBlog {
                            title: title.to_string(),
                            description: description.to_string(),
                        }
                    }
                    "select" => Command::SelectBlog(index(arg, "blog select <n>")?),
                    "delete" => Command::DeleteBlog(index(arg, "blog delete <n>")?),
                    _ => return Err(CommandError::Usage("blog new|select|delete")),
                }
            }
            "post" => {
                let (sub, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match sub {
                    "new" => Command::NewPost,
                    "edit" => Command::EditPost(index(arg, "post edit <n>")?),
                    "delete" => Command::DeletePost(index(arg, "post delete <n>")?),
                    "publish" => Command::TogglePublish(index(arg, "post publish <n>")?),
                    _ => return Err(CommandError::Usage("post new|edit|delete|publish")),
                }
            }
            "title" => Command::Title(rest.to_string()),
            "excerpt" => Command::Excerpt(rest.to_string()),
            "write" => Command::Write(rest.to_string()),
            "save" => Command::Save,
            "back" => Command::Back,
            "bio" => {
                let (name, bio) = pair(rest, "bio <display name> | <bio>")?;
                Command::UpdateProfile {
                    display_name: name.to_string(),
                    bio: bio.to_string(),
                }
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Render,
    Help,
    Quit,
}

fn nth<T>(items: &[T], index: usize) -> Result<&T, CommandError> {
    items.get(index).ok_or(CommandError::NoSuchItem(index + 1))
}

/// Apply a command to the app.
pub async fn execute(
    app: &mut App,
    command: Command,
    confirm: &mut dyn Confirm,
) -> Result<Step, CommandError> {
    let navigation = match command {
        Command::Help => return Ok(Step::Help),
        Command::Quit => return Ok(Step::Quit),
        Command::Go(page) => Some(Navigation::to(page)),
        Command::SignOut => {
            app.sign_out().await;
            None
        }
        Command::Nav(i) => {
            let layout = app.layout().ok_or(CommandError::Unavailable("nav"))?;
            match nth(layout.links(), i)?.target {
                Link::Go(page) => Some(Navigation::to(page)),
                Link::SignOut => {
                    app.sign_out().await;
                    None
                }
            }
        }
        command => on_view(app, command, confirm).await?,
    };

    if let Some(outcome) = app.follow(navigation).await {
        tracing::debug!(outcome = ?outcome, "Followed navigation");
    }
    Ok(Step::Render)
}

async fn on_view(
    app: &mut App,
    command: Command,
    confirm: &mut dyn Confirm,
) -> Result<Option<Navigation>, CommandError> {
    let name = command.name();
    let Some(view) = app.view_mut() else {
        return Err(CommandError::Unavailable(name));
    };

    let navigation = match (view, command) {
        (View::SignIn(page), Command::SignIn { email, password }) => {
            page.submit(&email, &password).await
        }
        (View::SignIn(page), Command::GetStarted) => Some(page.sign_up()),
        (View::SignUp(page), Command::SignUp { email, password, display_name }) => {
            page.submit(&display_name, &email, &password).await
        }
        (View::Home(page), Command::Open(i)) => {
            nth(&page.recent, i)?;
            page.open(i)
        }
        (View::Home(page), Command::GetStarted) => Some(page.get_started()),
        (View::Dashboard(page), Command::Open(i)) => {
            let id = nth(&page.posts, i)?.id;
            page.view_post(id)
        }
        (View::Dashboard(page), Command::NewBlog { title, description }) => {
            page.create_blog(&title, &description).await;
            None
        }
        (View::Dashboard(page), Command::SelectBlog(i)) => {
            let id = nth(&page.blogs, i)?.id;
            page.select_blog(id).await;
            None
        }
        (View::Dashboard(page), Command::DeleteBlog(i)) => {
            let id = nth(&page.blogs, i)?.id;
            page.delete_blog(id, confirm).await;
            None
        }
        (View::Dashboard(page), Command::NewPost) => page.new_post(),
        (View::Dashboard(page), Command::EditPost(i)) => {
            let id = nth(&page.posts, i)?.id;
            page.edit_post(id)
        }
        (View::Dashboard(page), Command::DeletePost(i)) => {
            let id = nth(&page.posts, i)?.id;
            page.delete_post(id, confirm).await;
            None
        }
        (View::Dashboard(page), Command::TogglePublish(i)) => {
            let id = nth(&page.posts, i)?.id;
            page.toggle_publish(id).await;
            None
        }
        (View::Editor(page), Command::Title(title)) => {
            page.set_title(title);
            None
        }
        (View::Editor(page), Command::Excerpt(excerpt)) => {
            page.set_excerpt(excerpt);
            None
        }
        (View::Editor(page), Command::Write(line)) => {
            page.append_content(&line);
            None
        }
        (View::Editor(page), Command::Save) => {
            page.save().await;
            None
        }
        (View::Editor(page), Command::Back) => Some(page.back()),
        (View::Post(page), Command::Back) => Some(page.back()),
        (View::Profile(page), Command::UpdateProfile { display_name, bio }) => {
            page.save(&display_name, &bio).await;
            None
        }
        _ => return Err(CommandError::Unavailable(name)),
    };
    Ok(navigation)
}

/// Yes/no prompt answered on stdin.
struct Prompt<'a> {
    lines: &'a mut Lines<BufReader<Stdin>>,
}

#[async_trait]
impl<'a> Confirm for Prompt<'a> {
    async fn confirm(&mut self, prompt: &str) -> bool {
        if write_out(&format!("{prompt} [y/N] ")).await.is_err() {
            return false;
        }
        match self.lines.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

async fn write_out(text: &str) -> std::io::Result<()> {
    let mut out = tokio::io::stdout();
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

async fn prompt(app: &App) -> std::io::Result<()> {
    write_out(&format!("{}> ", app.page())).await
}

/// Run the command loop until `quit` or end of input.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut auth_changes = app.auth().watch();

    write_out(&app.render()).await?;
    prompt(app).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    prompt(app).await?;
                    continue;
                }

                let step = match line.parse::<Command>() {
                    Ok(command) => execute(app, command, &mut Prompt { lines: &mut lines }).await,
                    Err(e) => Err(e),
                };
                auth_changes.borrow_and_update();

                match step {
                    Ok(Step::Quit) => break,
                    Ok(Step::Help) => write_out(HELP).await?,
                    Ok(Step::Render) => write_out(&app.render()).await?,
                    Err(e) => write_out(&format!("{e}\n")).await?,
                }
                prompt(app).await?;
            }
            changed = auth_changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if app.sync_auth().await.is_some() {
                    write_out("\n").await?;
                    write_out(&app.render()).await?;
                    prompt(app).await?;
                }
            }
        }
    }

    tracing::debug!("Terminal closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth_context::AuthContext;
    use crate::state::AppState;
    use std::sync::Arc;

    struct No;

    #[async_trait]
    impl Confirm for No {
        async fn confirm(&mut self, _prompt: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("go dashboard".parse::<Command>(), Ok(Command::Go(Page::Dashboard)));
        assert_eq!("home".parse::<Command>(), Ok(Command::Go(Page::Home)));
        assert_eq!("open 2".parse::<Command>(), Ok(Command::Open(1)));
        assert_eq!(
            "register ada@example.com secret1 Ada Lovelace".parse::<Command>(),
            Ok(Command::SignUp {
                email: "ada@example.com".into(),
                password: "secret1".into(),
                display_name: "Ada Lovelace".into(),
            })
        );
        assert_eq!(
            "blog new Daily Notes | Notes, daily".parse::<Command>(),
            Ok(Command::NewBlog {
                title: "Daily Notes".into(),
                description: "Notes, daily".into(),
            })
        );
        assert_eq!("post publish 1".parse::<Command>(), Ok(Command::TogglePublish(0)));
        assert_eq!("nav 3".parse::<Command>(), Ok(Command::Nav(2)));
        assert_eq!("write".parse::<Command>(), Ok(Command::Write(String::new())));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("open 0".parse::<Command>(), Err(CommandError::Usage("open <n>")));
        assert!(matches!("go nowhere".parse::<Command>(), Err(CommandError::Page(_))));
        assert!(matches!("dance".parse::<Command>(), Err(CommandError::Unknown(_))));
        assert!(matches!("blog new only a title".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[tokio::test]
    async fn test_execute_against_mounted_view() {
        let (state, _) = AppState::in_memory();
        let ctx = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
        ctx.start().await.unwrap();
        let mut app = App::new(state, ctx);
        app.sync_auth().await;

        assert_eq!(
            execute(&mut app, Command::Save, &mut No).await,
            Err(CommandError::Unavailable("save"))
        );

        execute(&mut app, Command::GetStarted, &mut No).await.unwrap();
        assert_eq!(app.page(), Page::SignUp);

        let register = "register ada@example.com secret1 Ada".parse().unwrap();
        execute(&mut app, register, &mut No).await.unwrap();
        assert_eq!(app.page(), Page::Dashboard);

        let new_blog = "blog new Notes | Daily".parse().unwrap();
        execute(&mut app, new_blog, &mut No).await.unwrap();
        execute(&mut app, Command::DeleteBlog(0), &mut No).await.unwrap();
        assert!(app.render().contains("Notes - Daily"));

        assert_eq!(
            execute(&mut app, Command::EditPost(4), &mut No).await,
            Err(CommandError::NoSuchItem(5))
        );
        execute(&mut app, Command::Nav(0), &mut No).await.unwrap();
        assert_eq!(app.page(), Page::Home);
        execute(&mut app, Command::Nav(3), &mut No).await.unwrap();
        assert!(app.auth().user().is_none());
        assert_eq!(
            execute(&mut app, Command::Nav(3), &mut No).await,
            Err(CommandError::NoSuchItem(4))
        );

        assert_eq!(execute(&mut app, Command::Quit, &mut No).await, Ok(Step::Quit));
    }
}
