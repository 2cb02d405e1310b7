use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::{Frame, Terminal};
use tui_treemap::{file_system, NodeId, TmTree, Treemap};

const HELP: &str =
    "click select | enter expand | c collapse | a/x all | +/- size | m mark, p move | q quit";

struct App {
    tree: TmTree,
    selected: Option<NodeId>,
    marked: Option<NodeId>,
}

impl App {
    const fn new(tree: TmTree) -> Self {
        Self {
            tree,
            selected: None,
            marked: None,
        }
    }

    fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    fn status(&self) -> String {
        let Some(selected) = self.selected else {
            return HELP.to_owned();
        };
        let path = self
            .tree
            .path_string(selected, true)
            .unwrap_or_else(|err| err.to_string());
        let size = self.tree[selected].data_size();
        match self.marked {
            Some(marked) => format!("{path} ({size} bytes) | moving {marked:?}"),
            None => format!("{path} ({size} bytes)"),
        }
    }

    fn click(&mut self, column: u16, row: u16) -> bool {
        let hit = self.tree.hit_test((column, row));
        let changed = hit != self.selected;
        self.selected = hit;
        changed
    }

    fn expand_selected(&mut self) -> bool {
        self.selected
            .is_some_and(|selected| self.tree.expand_path(selected))
    }

    fn collapse_selected(&mut self) -> bool {
        let Some(selected) = self.selected else {
            return false;
        };
        // The selected unit is what is visible, collapse what contains it
        let target = self.tree[selected].parent().unwrap_or(selected);
        self.tree.collapse(target);
        self.selected = Some(target);
        true
    }

    fn change_selected_size(&mut self, factor: f64) -> bool {
        let (Some(selected), Some(root)) = (self.selected, self.root()) else {
            return false;
        };
        let changed = self.tree.change_size(selected, factor);
        self.tree.update_data_sizes(root);
        changed
    }

    fn move_marked(&mut self) -> bool {
        let (Some(marked), Some(selected), Some(root)) = (self.marked, self.selected, self.root())
        else {
            return false;
        };
        let destination = if self.tree[selected].is_leaf() {
            self.tree[selected].parent().unwrap_or(selected)
        } else {
            selected
        };
        let moved = self.tree.move_to(marked, destination);
        self.tree.update_data_sizes(root);
        self.marked = None;
        moved
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let main = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        let status = Rect {
            y: area.y + main.height,
            height: area.height - main.height,
            ..area
        };

        let widget = Treemap::new()
            .block(Block::bordered().title("Treemap"))
            .highlight(self.selected)
            .highlight_style(
                Style::new()
                    .fg(Color::Black)
                    .bg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(widget, main, &mut self.tree);
        frame.render_widget(
            Span::styled(self.status(), Style::new().fg(Color::Black).bg(Color::Gray)),
            status,
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| ".".to_owned());
    let tree = file_system::from_path(Path::new(&path))?;

    // Terminal initialization
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // App
    let app = App::new(tree);
    let res = run_app(&mut terminal, app);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    const DEBOUNCE: Duration = Duration::from_millis(20); // 50 FPS

    terminal.draw(|frame| app.draw(frame))?;

    let mut debounce: Option<Instant> = None;

    loop {
        let timeout = debounce.map_or(DEBOUNCE, |start| DEBOUNCE.saturating_sub(start.elapsed()));
        if crossterm::event::poll(timeout)? {
            let update = match crossterm::event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Enter | KeyCode::Char(' ') => app.expand_selected(),
                    KeyCode::Char('c') | KeyCode::Backspace => app.collapse_selected(),
                    KeyCode::Char('a') => app.root().is_some_and(|root| {
                        app.tree.expand_all(root);
                        true
                    }),
                    KeyCode::Char('x') => app.root().is_some_and(|root| {
                        app.tree.collapse_all(root);
                        app.selected = None;
                        true
                    }),
                    KeyCode::Char('+') => app.change_selected_size(0.01),
                    KeyCode::Char('-') => app.change_selected_size(-0.01),
                    KeyCode::Char('m') => {
                        app.marked = app.selected.filter(|&id| app.tree[id].is_leaf());
                        true
                    }
                    KeyCode::Char('p') => app.move_marked(),
                    KeyCode::Esc => {
                        app.selected = None;
                        app.marked = None;
                        true
                    }
                    _ => false,
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
                    _ => false,
                },
                Event::Resize(_, _) => true,
                _ => false,
            };
            if update {
                debounce.get_or_insert_with(Instant::now);
            }
        }
        if debounce.is_some_and(|debounce| debounce.elapsed() > DEBOUNCE) {
            terminal.draw(|frame| app.draw(frame))?;
            debounce = None;
        }
    }
}
