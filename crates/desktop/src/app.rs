//! Cue Desktop — egui app state and UI.

use eframe::egui;
use lib::agent::DialogClient;
use lib::history::{ChatHistory, Message, Origin};
use lib::session::Session;
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

const CHAT_INPUT_HEIGHT: f32 = 90.0;
const CHAT_MESSAGES_MIN_HEIGHT: f32 = 80.0;
const LOG_BUFFER_MAX_LINES: usize = 2000;

const GREETING: &str = "Hello! I'm Cue.\n\nI pass your questions to the configured agent.\n\nWhat can I help you with?";

/// Ring buffer of log lines for the Logs screen. Written by DesktopLogger.
static LOG_LINES: OnceLock<Mutex<VecDeque<String>>> = OnceLock::new();

fn log_buffer() -> &'static Mutex<VecDeque<String>> {
    LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn push_log_line(line: String) {
    if let Ok(mut buf) = log_buffer().lock() {
        buf.push_back(line);
        while buf.len() > LOG_BUFFER_MAX_LINES {
            buf.pop_front();
        }
    }
}

/// Logger that appends to LOG_LINES for display in the Logs screen.
struct DesktopLogger;

impl log::Log for DesktopLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!("{} [{}] {}", clock_lite(), record.level(), record.args());
        push_log_line(line);
    }

    fn flush(&self) {}
}

fn clock_lite() -> String {
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = t.as_secs();
    let millis = t.subsec_millis();
    let h = (secs / 3600) % 24;
    let m = (secs / 60) % 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, millis)
}

static LOGGER: DesktopLogger = DesktopLogger;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    Info,
    #[default]
    Chat,
    Logs,
}

/// Everything a turn needs, built once from config at startup.
struct Setup {
    session: Session,
    client: DialogClient,
    language_code: String,
}

/// Load config and build the dialog client. A missing agent identity or token
/// is a setup failure shown on the Info screen; send stays disabled.
fn load_setup() -> Result<Setup, String> {
    let (config, path) = lib::config::load_config(None).map_err(|e| e.to_string())?;
    lib::init::require_configured(&config).map_err(|e| {
        format!("{} (config: {})", e, path.display())
    })?;
    let token = lib::config::resolve_access_token(&config).ok_or("no access token")?;
    let session = Session::for_agent(&config.agent);
    let client = DialogClient::new(config.agent.endpoint.clone(), token);
    log::info!("setup: session {}", session.id);
    Ok(Setup {
        session,
        client,
        language_code: config.agent.language_code,
    })
}

/// Run one turn on a background runtime: send the text, interpret the reply.
fn run_turn(
    client: DialogClient,
    session_name: String,
    text: String,
    language_code: String,
) -> Result<Vec<Message>, String> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    rt.block_on(async move {
        let response = client
            .detect_intent(&session_name, &text, &language_code)
            .await
            .map_err(|e| e.to_string())?;
        Ok(lib::reply::interpret(&response))
    })
}

pub struct CueApp {
    /// When Some, the client is configured and turns can be sent.
    setup: Option<Setup>,
    /// Setup failure from config load/validation, shown on Info and Chat.
    setup_error: Option<String>,
    /// The conversation transcript (append-only).
    history: ChatHistory,
    /// Current input text for the chat box.
    chat_input: String,
    /// Last failed turn, if any ("message failed: ...").
    chat_error: Option<String>,
    /// Non-error notice (e.g. empty input, empty reply).
    chat_hint: Option<String>,
    /// When Some, a turn is in flight; we read the result here. At most one
    /// turn is outstanding at a time.
    turn_receiver: Option<mpsc::Receiver<Result<Vec<Message>, String>>>,
    /// Current screen (Info, Chat, Logs).
    current_screen: Screen,
}

impl CueApp {
    /// Space between the screen title and the content below.
    const SCREEN_TITLE_BOTTOM_SPACING: f32 = 18.0;
    /// Space between the bottom of the content and the window edge.
    const SCREEN_FOOTER_SPACING: f32 = 24.0;

    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let _ = LOG_LINES.get_or_init(|| Mutex::new(VecDeque::new()));
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);
        log::info!("desktop started");

        let (setup, setup_error) = match load_setup() {
            Ok(s) => (Some(s), None),
            Err(e) => {
                log::error!("setup failed: {}", e);
                (None, Some(e))
            }
        };

        let mut history = ChatHistory::new();
        history.append(Message::agent(GREETING));

        Self {
            setup,
            setup_error,
            history,
            chat_input: String::new(),
            chat_error: None,
            chat_hint: None,
            turn_receiver: None,
            current_screen: Screen::default(),
        }
    }

    /// Drop the conversation: fresh session id, fresh transcript.
    /// Re-runs setup so the new session binds to the currently configured agent.
    fn start_new_session(&mut self) {
        match load_setup() {
            Ok(s) => {
                self.setup = Some(s);
                self.setup_error = None;
            }
            Err(e) => {
                self.setup = None;
                self.setup_error = Some(e);
            }
        }
        self.history = ChatHistory::new();
        self.history.append(Message::agent(GREETING));
        self.chat_error = None;
        self.chat_hint = None;
        self.turn_receiver = None;
        log::info!("started a new session");
    }

    /// Append the user entry and run the turn on a background thread.
    /// Returns without sending while another turn is in flight.
    fn send_message(&mut self, text: String) {
        if self.turn_receiver.is_some() {
            return;
        }
        let Some(ref setup) = self.setup else {
            self.chat_error = Some("not configured; see the Info screen".to_string());
            return;
        };
        self.chat_error = None;
        self.chat_hint = None;
        self.history.append(Message::user(text.clone()));

        let client = setup.client.clone();
        let session_name = setup.session.name.clone();
        let language_code = setup.language_code.clone();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(run_turn(client, session_name, text, language_code));
        });
        self.turn_receiver = Some(rx);
    }

    /// Send whatever is in the input box, if anything.
    fn start_chat_turn(&mut self) {
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            self.chat_hint = Some("Please enter a message.".to_string());
            return;
        }
        self.chat_input.clear();
        self.send_message(message);
    }

    /// Poll for the turn result and clear the receiver when done. Call each frame.
    fn poll_chat_turn(&mut self) {
        if let Some(rx) = &self.turn_receiver {
            if let Ok(result) = rx.try_recv() {
                self.turn_receiver = None;
                match result {
                    Ok(messages) => {
                        if messages.is_empty() {
                            self.chat_hint =
                                Some("The agent sent nothing to display.".to_string());
                        }
                        for m in messages {
                            self.history.append(m);
                        }
                    }
                    Err(e) => {
                        log::error!("chat turn failed: {}", e);
                        self.chat_error = Some(format!("message failed: {}", e));
                    }
                }
            }
        }
    }

    /// Renders a single message (user, agent reply, or card with chips and a
    /// link button). Chip clicks are reported back through `clicked_chip`;
    /// link clicks only ask the platform to open the URL.
    fn render_chat_message(ui: &mut egui::Ui, m: &Message, clicked_chip: &mut Option<String>) {
        let is_user = m.origin == Origin::User;
        let frame = egui::Frame::none()
            .fill(if is_user {
                ui.style().visuals.extreme_bg_color
            } else {
                ui.style().visuals.panel_fill
            })
            .stroke(egui::Stroke::new(
                1.0,
                ui.style().visuals.widgets.noninteractive.bg_stroke.color,
            ))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(8.0));

        frame.show(ui, |ui| {
            match m.origin {
                Origin::User => {
                    ui.label(egui::RichText::new(&m.text).strong());
                }
                Origin::Agent => {
                    ui.label(&m.text);
                }
                Origin::Card => {
                    if !m.text.is_empty() {
                        ui.label(&m.text);
                    }
                    if !m.actions.is_empty() || m.has_link() {
                        ui.add_space(6.0);
                        ui.horizontal_wrapped(|ui| {
                            for label in &m.actions {
                                if ui.button(label).clicked() {
                                    *clicked_chip = Some(label.clone());
                                }
                            }
                            if m.has_link() {
                                if ui.button("Open link").clicked() {
                                    ui.ctx().open_url(egui::OpenUrl::new_tab(&m.link));
                                }
                            }
                        });
                    }
                }
            }
        });
    }

    /// Render the chat UI (messages + input). Messages area fills the space
    /// with stick-to-bottom; input and controls are fixed at the bottom.
    fn ui_chat(&mut self, ui: &mut egui::Ui) {
        let can_send = self.setup.is_some() && self.turn_receiver.is_none();

        let row_height = ui.spacing().interact_size.y + 8.0;
        let bottom_section_height =
            CHAT_INPUT_HEIGHT + 8.0 + row_height + Self::SCREEN_FOOTER_SPACING;
        let available = ui.available_height();
        let messages_height = (available - bottom_section_height).max(CHAT_MESSAGES_MIN_HEIGHT);

        let messages_width = ui.available_width();
        let messages_rect = ui
            .allocate_exact_size(
                egui::vec2(messages_width, messages_height),
                egui::Sense::hover(),
            )
            .0;
        let mut messages_ui =
            ui.child_ui(messages_rect, egui::Layout::top_down(egui::Align::Min));

        let messages_to_show: Vec<Message> = self.history.all().to_vec();
        let mut clicked_chip: Option<String> = None;
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(&mut messages_ui, |ui| {
                // Force scroll content to be at least viewport width so the scrollbar stays on the right
                let content_width = ui.available_width();
                ui.allocate_exact_size(egui::vec2(content_width, 0.0), egui::Sense::hover());
                for m in &messages_to_show {
                    Self::render_chat_message(ui, m, &mut clicked_chip);
                    ui.add_space(8.0);
                }
                if self.turn_receiver.is_some() {
                    ui.label("…");
                }
            });
        if let Some(label) = clicked_chip {
            // A chip tap behaves exactly like typing the label and sending it.
            if can_send {
                self.send_message(label);
            }
        }

        ui.add_space(8.0);

        let text_response = ui.add_enabled_ui(can_send, |ui| {
            ui.add_sized(
                [ui.available_width(), CHAT_INPUT_HEIGHT],
                egui::TextEdit::multiline(&mut self.chat_input),
            )
        });
        let response = text_response.inner;
        ui.add_space(8.0);

        let row_width = ui.available_width();
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(row_width, row_height), egui::Sense::hover());
        let mut row_ui = ui.child_ui(rect, egui::Layout::right_to_left(egui::Align::Center));
        egui::Frame::none()
            .inner_margin(egui::Margin {
                left: 0.0,
                right: 8.0,
                top: 4.0,
                bottom: 4.0,
            })
            .show(&mut row_ui, |ui| {
                let mut send_now = false;

                let send_button = ui.add_enabled(can_send, egui::Button::new("Send"));

                ui.add_space(8.0);
                if ui
                    .add_enabled(self.turn_receiver.is_none(), egui::Button::new("New session"))
                    .clicked()
                {
                    self.start_new_session();
                }

                if send_button.clicked() {
                    send_now = true;
                }
                if can_send && response.has_focus() {
                    let modifiers = ui.input(|i| i.modifiers);
                    if modifiers.command || modifiers.ctrl {
                        if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            send_now = true;
                        }
                    }
                }
                if send_now {
                    self.start_chat_turn();
                }
            });

        if let Some(ref err) = self.setup_error {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, err);
        }
        if let Some(ref err) = self.chat_error {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, err);
        }
        if let Some(ref hint) = self.chat_hint {
            ui.add_space(8.0);
            ui.label(hint.as_str());
        }
        ui.add_space(Self::SCREEN_FOOTER_SPACING);
    }

    fn ui_info_screen(&self, ui: &mut egui::Ui) {
        const INFO_LINE_SPACING: f32 = 6.0;
        const INFO_SUBSECTION_SPACING: f32 = 18.0;
        ui.add_space(24.0);
        ui.heading("Info");
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);

        let (config, path) = lib::config::load_config(None)
            .unwrap_or((lib::config::Config::default(), std::path::PathBuf::new()));

        ui.label(egui::RichText::new("Agent").strong());
        ui.add_space(INFO_LINE_SPACING);
        ui.label(format!("Config file: {}", path.display()));
        ui.add_space(INFO_LINE_SPACING);
        let or_unset = |s: &str| {
            if s.trim().is_empty() {
                "(unset)".to_string()
            } else {
                s.to_string()
            }
        };
        ui.label(format!("Project: {}", or_unset(&config.agent.project_id)));
        ui.add_space(INFO_LINE_SPACING);
        ui.label(format!("Location: {}", or_unset(&config.agent.location_id)));
        ui.add_space(INFO_LINE_SPACING);
        ui.label(format!("Agent: {}", or_unset(&config.agent.agent_id)));
        ui.add_space(INFO_LINE_SPACING);
        ui.label(format!("Endpoint: {}", config.agent.endpoint));
        ui.add_space(INFO_LINE_SPACING);
        ui.label(format!("Language: {}", config.agent.language_code));
        ui.add_space(INFO_LINE_SPACING);
        let token_state = if lib::config::resolve_access_token(&config).is_some() {
            "set"
        } else {
            "missing"
        };
        ui.label(format!("Access token: {}", token_state));
        ui.add_space(INFO_SUBSECTION_SPACING);

        ui.label(egui::RichText::new("Session").strong());
        ui.add_space(INFO_LINE_SPACING);
        if let Some(ref setup) = self.setup {
            ui.label(format!("Id: {}", setup.session.id));
        } else {
            ui.label("No session (setup failed).");
        }
        ui.add_space(INFO_LINE_SPACING);
        if let Some(ref err) = self.setup_error {
            ui.colored_label(egui::Color32::RED, err);
            ui.add_space(INFO_LINE_SPACING);
        }
        ui.add_space(Self::SCREEN_FOOTER_SPACING);
    }

    fn ui_logs_screen(&self, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.heading("Logs");
        ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);

        let lines: Vec<String> = log_buffer()
            .lock()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default();

        let available = ui.available_height();
        let scroll_height = (available - Self::SCREEN_FOOTER_SPACING).max(0.0);
        egui::ScrollArea::vertical()
            .max_height(scroll_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &lines {
                    ui.label(
                        egui::RichText::new(line.as_str()).family(egui::FontFamily::Monospace),
                    );
                }
                if lines.is_empty() {
                    ui.label("No log output yet.");
                }
            });
        ui.add_space(Self::SCREEN_FOOTER_SPACING);
    }
}

impl eframe::App for CueApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_chat_turn();
        if self.turn_receiver.is_some() {
            // Keep polling while a turn is in flight, even without input events.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    ui.horizontal(|ui| {
                        ui.heading("Cue");
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if self.setup.is_none() {
                                ui.colored_label(egui::Color32::RED, "not configured");
                            }
                        });
                    });
                    ui.add_space(16.0);
                });
        });

        let current_screen = &mut self.current_screen;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(100.0)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(16.0, 0.0))
                    .show(ui, |ui| {
                        ui.add_space(24.0);
                        if ui
                            .selectable_label(*current_screen == Screen::Chat, "Chat")
                            .clicked()
                        {
                            *current_screen = Screen::Chat;
                        }
                        ui.add_space(12.0);
                        if ui
                            .selectable_label(*current_screen == Screen::Info, "Info")
                            .clicked()
                        {
                            *current_screen = Screen::Info;
                        }
                        ui.add_space(12.0);
                        if ui
                            .selectable_label(*current_screen == Screen::Logs, "Logs")
                            .clicked()
                        {
                            *current_screen = Screen::Logs;
                        }
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.current_screen {
                Screen::Chat => {
                    egui::Frame::none()
                        .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                        .show(ui, |ui| {
                            ui.add_space(24.0);
                            ui.heading("Chat");
                            ui.add_space(Self::SCREEN_TITLE_BOTTOM_SPACING);
                            self.ui_chat(ui);
                        });
                }
                Screen::Info => {
                    egui::Frame::none()
                        .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                        .show(ui, |ui| {
                            self.ui_info_screen(ui);
                        });
                }
                Screen::Logs => {
                    // Logs screen has its own scroll area; avoid double scrollbars
                    egui::Frame::none()
                        .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                        .show(ui, |ui| {
                            self.ui_logs_screen(ui);
                        });
                }
            }
        });
    }
}
