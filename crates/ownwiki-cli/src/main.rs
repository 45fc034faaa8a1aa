use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ownwiki_config::Config;
use ownwiki_engine::{Article, SaveCheck, SaveMode, StoreError, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{env, io::stdout, path::PathBuf, process};

mod render;
use render::{RenderedArticle, render_article};

#[derive(PartialEq)]
enum Focus {
    List,
    Article,
}

enum Prompt {
    NewName { input: String },
    ConfirmDelete(Article),
    ConfirmOverwrite { name: String },
}

/// The article currently shown in the content panel.
struct CurrentArticle {
    article: Article,
    content: String,
    rendered: RenderedArticle,
    selected_link: Option<usize>,
    scroll: u16,
}

struct App {
    wiki_root: PathBuf,
    editor_override: Option<String>,
    articles: Vec<Article>,
    list_state: ListState,
    current: Option<CurrentArticle>,
    focus: Focus,
    /// Articles walked through by following links; popped by Esc/Backspace.
    history: Vec<Article>,
    prompt: Option<Prompt>,
    status: Option<String>,
}

impl App {
    fn new(wiki_root: PathBuf, editor_override: Option<String>) -> Result<Self> {
        let articles = io::list_articles(&wiki_root)?;

        let mut app = Self {
            wiki_root,
            editor_override,
            articles,
            list_state: ListState::default(),
            current: None,
            focus: Focus::List,
            history: Vec::new(),
            prompt: None,
            status: None,
        };

        if !app.articles.is_empty() {
            app.list_state.select(Some(0));
            app.load_selected();
        }

        Ok(app)
    }

    fn next_article(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.articles.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.load_selected();
    }

    fn previous_article(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.articles.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
        self.load_selected();
    }

    fn selected_article(&self) -> Option<&Article> {
        self.list_state.selected().and_then(|i| self.articles.get(i))
    }

    /// Shows the list selection in the content panel, resetting any link
    /// trail walked from a previous article.
    fn load_selected(&mut self) {
        self.history.clear();
        if let Some(article) = self.selected_article().cloned() {
            self.show_article(article);
        }
    }

    fn show_article(&mut self, article: Article) {
        match io::read(&article, &self.wiki_root) {
            Ok(content) => {
                self.current = Some(CurrentArticle {
                    rendered: render_article(&content, None),
                    article,
                    content,
                    selected_link: None,
                    scroll: 0,
                });
            }
            Err(e) => {
                self.status = Some(format!("Error reading article: {e}"));
                self.current = None;
            }
        }
    }

    fn refresh_articles(&mut self) -> Result<()> {
        self.articles = io::list_articles(&self.wiki_root)?;
        if self.articles.is_empty() {
            self.list_state.select(None);
            self.current = None;
            self.focus = Focus::List;
        } else {
            let i = self
                .list_state
                .selected()
                .unwrap_or(0)
                .min(self.articles.len() - 1);
            self.list_state.select(Some(i));
            self.load_selected();
        }
        Ok(())
    }

    fn cycle_link(&mut self, forward: bool) {
        let Some(cur) = &mut self.current else {
            return;
        };
        let count = cur.rendered.links.len();
        if count == 0 {
            self.status = Some("No links in this article".to_string());
            return;
        }
        let next = match cur.selected_link {
            None => {
                if forward {
                    0
                } else {
                    count - 1
                }
            }
            Some(i) => {
                if forward {
                    (i + 1) % count
                } else {
                    (i + count - 1) % count
                }
            }
        };
        cur.selected_link = Some(next);
        cur.rendered = render_article(&cur.content, cur.selected_link);
    }

    fn follow_selected_link(&mut self) {
        let Some(cur) = &self.current else {
            return;
        };
        let Some(i) = cur.selected_link else {
            self.status = Some("No link selected; Tab cycles links".to_string());
            return;
        };
        let href = cur.rendered.links[i].href.clone();
        let from = cur.article.clone();
        let target = Article::new(&href);
        match io::read(&target, &self.wiki_root) {
            Ok(content) => {
                self.history.push(from);
                self.current = Some(CurrentArticle {
                    rendered: render_article(&content, None),
                    article: target,
                    content,
                    selected_link: None,
                    scroll: 0,
                });
            }
            Err(StoreError::NotFound(_)) => {
                self.status = Some(format!("No such article: {href}"));
            }
            Err(e) => {
                self.status = Some(format!("Error following link: {e}"));
            }
        }
    }

    fn go_back(&mut self) {
        match self.history.pop() {
            Some(previous) => self.show_article(previous),
            None => self.focus = Focus::List,
        }
    }

    fn scroll_down(&mut self) {
        if let Some(cur) = &mut self.current {
            cur.scroll = cur.scroll.saturating_add(1);
        }
    }

    fn scroll_up(&mut self) {
        if let Some(cur) = &mut self.current {
            cur.scroll = cur.scroll.saturating_sub(1);
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(article) = self.selected_article().cloned() {
            self.prompt = Some(Prompt::ConfirmDelete(article));
        }
    }

    fn delete_article(&mut self, article: &Article) -> Result<()> {
        io::remove(article, &self.wiki_root)?;
        self.refresh_articles()?;
        self.focus = Focus::List;
        self.status = Some(format!(
            "Deleted {}; recoverable under removed/",
            article.name()
        ));
        Ok(())
    }

    fn submit_new_name(&mut self, name: &str) -> Result<()> {
        let seed = seed_content(name);
        match io::check_save(&self.wiki_root, name, &seed, SaveMode::Create)? {
            SaveCheck::BlankName => {
                self.status = Some("Article name cannot be blank".to_string());
            }
            SaveCheck::DuplicateName => {
                self.prompt = Some(Prompt::ConfirmOverwrite {
                    name: name.to_string(),
                });
            }
            SaveCheck::BlankContent | SaveCheck::Ok => {
                self.create_article(name)?;
            }
        }
        Ok(())
    }

    fn create_article(&mut self, name: &str) -> Result<()> {
        let article = Article::new(name);
        io::create(&article, &self.wiki_root, &seed_content(name))?;
        self.refresh_articles()?;
        if let Some(pos) = self.articles.iter().position(|a| a.name() == name) {
            self.list_state.select(Some(pos));
            self.load_selected();
        }
        self.status = Some(format!("Created {name}"));
        Ok(())
    }

    fn open_existing(&mut self, name: &str) {
        if let Some(pos) = self
            .articles
            .iter()
            .position(|a| a.name().eq_ignore_ascii_case(name))
        {
            self.list_state.select(Some(pos));
            self.load_selected();
            self.focus = Focus::Article;
        }
    }

    /// Handles one key while a prompt is open. The prompt is passed by value
    /// and put back unless the key resolved it.
    fn handle_prompt_key(&mut self, prompt: Prompt, code: KeyCode) -> Result<()> {
        match prompt {
            Prompt::NewName { mut input } => match code {
                KeyCode::Esc => {}
                KeyCode::Enter => self.submit_new_name(input.trim())?,
                KeyCode::Backspace => {
                    input.pop();
                    self.prompt = Some(Prompt::NewName { input });
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    self.prompt = Some(Prompt::NewName { input });
                }
                _ => self.prompt = Some(Prompt::NewName { input }),
            },
            Prompt::ConfirmDelete(article) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.delete_article(&article)?,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                _ => self.prompt = Some(Prompt::ConfirmDelete(article)),
            },
            Prompt::ConfirmOverwrite { name } => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.create_article(&name)?,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.open_existing(&name),
                _ => self.prompt = Some(Prompt::ConfirmOverwrite { name }),
            },
        }
        Ok(())
    }
}

/// New articles start with their name as a heading, so there is something to
/// render before the first edit.
fn seed_content(name: &str) -> String {
    format!("# {name}\n")
}

fn editor_command(override_cmd: Option<&str>) -> (String, Vec<String>) {
    let raw = override_cmd
        .map(str::to_string)
        .or_else(|| env::var("VISUAL").ok())
        .or_else(|| env::var("EDITOR").ok())
        .unwrap_or_else(|| "vi".to_string());
    let mut parts = raw.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_else(|| "vi".to_string());
    (program, parts.collect())
}

/// Suspends the TUI and opens the current article in an external editor.
/// When the editor changed the file, the previous revision is archived.
fn edit_current<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    let Some(cur) = &app.current else {
        app.status = Some("No article selected".to_string());
        return Ok(());
    };
    let article = cur.article.clone();
    let before = cur.content.clone();
    let path = io::article_path(&article, &app.wiki_root);
    let (program, args) = editor_command(app.editor_override.as_deref());

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    let status = process::Command::new(&program).args(&args).arg(&path).status();
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    terminal.clear()?;

    match status {
        Ok(exit) if exit.success() => {
            let after = io::read(&article, &app.wiki_root)?;
            if after != before {
                io::archive_revision(&article, &app.wiki_root, &before)?;
                app.status = Some(format!(
                    "Saved {}; previous revision archived",
                    article.name()
                ));
            }
            app.show_article(article);
        }
        Ok(exit) => {
            app.status = Some(format!("Editor exited with {exit}"));
        }
        Err(e) => {
            app.status = Some(format!("Failed to launch editor '{program}': {e}"));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Determine the wiki root from CLI args or the config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let editor_override = config.as_ref().and_then(|c| c.editor.clone());

    let wiki_root;
    let from_config;

    if args.len() == 2 {
        wiki_root = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match config {
            Some(config) => {
                wiki_root = config.wiki_path;
                from_config = true;
            }
            None => {
                eprintln!("Error: No wiki path provided and no config file found");
                eprintln!("Usage: {} <wiki-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [wiki-folder-path]", args[0]);
        process::exit(1);
    };

    if let Err(e) = io::validate_wiki_dir(&wiki_root) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Wiki path '{}'{} is invalid: {e}",
            wiki_root.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(wiki_root, editor_override)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if let Some(prompt) = app.prompt.take() {
                app.handle_prompt_key(prompt, key.code)?;
                continue;
            }

            app.status = None;
            match app.focus {
                Focus::List => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next_article(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_article(),
                    KeyCode::Enter => {
                        if app.current.is_some() {
                            app.focus = Focus::Article;
                        }
                    }
                    KeyCode::Char('n') => {
                        app.prompt = Some(Prompt::NewName {
                            input: String::new(),
                        });
                    }
                    KeyCode::Char('d') => app.confirm_delete(),
                    KeyCode::Char('e') => edit_current(terminal, app)?,
                    KeyCode::Char('r') => app.refresh_articles()?,
                    _ => {}
                },
                Focus::Article => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc | KeyCode::Backspace => app.go_back(),
                    KeyCode::Tab => app.cycle_link(true),
                    KeyCode::BackTab => app.cycle_link(false),
                    KeyCode::Enter => app.follow_selected_link(),
                    KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
                    KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
                    KeyCode::Char('e') => edit_current(terminal, app)?,
                    _ => {}
                },
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(outer[0]);

    // Article list panel
    let items: Vec<ListItem> = app
        .articles
        .iter()
        .map(|a| ListItem::new(Line::from(Span::raw(a.name().to_string()))))
        .collect();
    let highlight = if app.focus == Focus::List {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::DarkGray)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Articles"))
        .highlight_style(highlight);
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    // Content panel
    let (title, text, scroll) = match &app.current {
        Some(cur) => (
            cur.article.name().to_string(),
            cur.rendered.lines.clone(),
            cur.scroll,
        ),
        None => (
            "Article".to_string(),
            vec![Line::from("Select an article, or press n to create one")],
            0,
        ),
    };
    let content = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(content, chunks[1]);

    // Prompt / status / key help line
    let bottom = match &app.prompt {
        Some(Prompt::NewName { input }) => Line::from(format!(
            "New article name: {input}  (Enter to create, Esc to cancel)"
        )),
        Some(Prompt::ConfirmDelete(article)) => Line::from(format!(
            "Delete '{}'? It will move to removed/ (y/n)",
            article.name()
        )),
        Some(Prompt::ConfirmOverwrite { name }) => Line::from(format!(
            "'{name}' already exists. Overwrite it? (y = overwrite, n = open existing)"
        )),
        None => match &app.status {
            Some(message) => Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            )),
            None => match app.focus {
                Focus::List => Line::from(
                    "q: Quit | ↑/k ↓/j: Select | Enter: Read | n: New | e: Edit | d: Delete | r: Refresh",
                ),
                Focus::Article => Line::from(
                    "q: Quit | Esc: Back | Tab: Next link | Enter: Follow link | ↑/k ↓/j: Scroll | e: Edit",
                ),
            },
        },
    };
    f.render_widget(Paragraph::new(vec![bottom]), outer[1]);
}
