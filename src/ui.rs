use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{
    App, FocusPane, InputField, InputMode, ProfileField, RecordsTab, SymptomField, Toast,
    HOME_SERVICES, SUGGESTION_PROMPTS,
};
use crate::conversation::Role;
use crate::route::Route;

/// Opening line shown while the chat log is still empty.
const GREETING: &str = "Hello! I'm your AI health assistant. I can answer questions about \
symptoms, medications, and general health concerns. How can I help you today?";

const DISCLAIMER: &str = "This is an AI-generated preliminary analysis and not a medical \
diagnosis. Please consult with a healthcare professional for proper evaluation.";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' {
            // Check for ** (bold)
            if chars.peek().map(|(_, c)| *c) == Some('*') {
                chars.next();

                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }

                // Find closing **
                let mut bold_text = String::new();
                let mut found_close = false;

                while let Some((_, c)) = chars.next() {
                    if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                        chars.next();
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            } else {
                current_text.push(c);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Model replies go straight to the terminal. Strip control characters,
/// keeping newlines, so a hostile reply cannot move the cursor or switch
/// screen modes.
fn sanitize_reply(text: &str) -> String {
    text.chars().filter(|c| *c == '\n' || !c.is_control()).collect()
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let screen = app.active_screen();
    match screen {
        Route::SignIn => render_sign_in(app, frame, body_area),
        Route::NotFound => render_not_found(frame, body_area),
        _ => {
            // Dashboard screens share the sidebar.
            let [menu_area, screen_area] =
                Layout::horizontal([Constraint::Length(26), Constraint::Min(0)]).areas(body_area);

            render_menu(app, frame, menu_area);

            match screen {
                Route::Home => render_home(app, frame, screen_area),
                Route::Consultations => render_consultations(app, frame, screen_area),
                Route::Assistant => render_assistant(app, frame, screen_area),
                Route::Symptoms => render_symptoms(app, frame, screen_area),
                Route::Records => render_records(app, frame, screen_area),
                Route::Appointments => render_appointments(app, frame, screen_area),
                Route::Profile => render_profile(app, frame, screen_area),
                Route::SignIn | Route::NotFound => {}
            }
        }
    }

    render_footer(app, frame, footer_area);

    if app.booking_doctor.is_some() {
        render_booking_confirm(app, frame, area);
    }
    if let Some(toast) = &app.toast {
        render_toast(toast, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let user = app
        .session
        .user()
        .map(|u| format!(" {} ", u.name))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Remedy ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Telehealth ", Style::default().fg(Color::White)),
        Span::styled(user, Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let screen = app.active_screen();
    let mode_text = match screen {
        Route::Home => " HOME ",
        Route::Consultations => " CONSULT ",
        Route::Assistant => " AI ",
        Route::Records => " RECORDS ",
        Route::Symptoms => " SYMPTOMS ",
        Route::Appointments => " APPTS ",
        Route::Profile => " PROFILE ",
        Route::SignIn => " SIGN IN ",
        Route::NotFound => " 404 ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let pair = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut hints: Vec<Span> = Vec::new();

    if app.booking_doctor.is_some() {
        hints.extend(pair(" Enter ", " confirm "));
        hints.extend(pair(" Esc ", " cancel "));
    } else if matches!(screen, Route::SignIn) {
        hints.extend(pair(" Enter ", " sign in "));
        hints.extend(pair(" q ", " quit "));
    } else if matches!(screen, Route::NotFound) {
        hints.extend(pair(" Enter ", " home "));
        hints.extend(pair(" q ", " quit "));
    } else if app.input_mode == InputMode::Editing {
        match screen {
            Route::Assistant => {
                hints.extend(pair(" Enter ", " send "));
                hints.extend(pair(" Esc ", " stop typing "));
            }
            Route::Symptoms => {
                hints.extend(pair(" Tab ", " next field "));
                hints.extend(pair(" Esc ", " done "));
            }
            Route::Profile => {
                hints.extend(pair(" Tab ", " next field "));
                hints.extend(pair(" Enter ", " save "));
                hints.extend(pair(" Esc ", " discard "));
            }
            _ => {}
        }
    } else if app.focus == FocusPane::Menu {
        hints.extend(pair(" j/k ", " nav "));
        hints.extend(pair(" Enter ", " open "));
        hints.extend(pair(" Tab ", " screen "));
        hints.extend(pair(" q ", " quit "));
    } else {
        match screen {
            Route::Home => {
                hints.extend(pair(" j/k ", " nav "));
                hints.extend(pair(" Enter ", " open "));
            }
            Route::Assistant => {
                hints.extend(pair(" i ", " ask "));
                if app.chat.is_empty() && !app.chat.is_pending() {
                    hints.extend(pair(" 1-4 ", " suggestions "));
                }
                hints.extend(pair(" x ", if app.attach_context { " records off " } else { " records on " }));
                hints.extend(pair(" j/k ", " scroll "));
            }
            Route::Symptoms => {
                hints.extend(pair(" j/k ", " field "));
                hints.extend(pair(" Enter ", " edit "));
                hints.extend(pair(" s ", " submit "));
                hints.extend(pair(" n ", " new "));
            }
            Route::Consultations => {
                hints.extend(pair(" j/k ", " nav "));
                hints.extend(pair(" Enter ", " book "));
            }
            Route::Records => {
                hints.extend(pair(" h/l ", " tab "));
                if app.records_tab == RecordsTab::Records {
                    hints.extend(pair(" j/k ", " nav "));
                }
            }
            Route::Appointments => {
                hints.extend(pair(" j/k ", " nav "));
                hints.extend(pair(" Enter ", " join "));
                hints.extend(pair(" c ", " cancel "));
            }
            Route::Profile => {
                hints.extend(pair(" e ", " edit "));
                hints.extend(pair(" o ", " sign out "));
            }
            Route::SignIn | Route::NotFound => {}
        }
        hints.extend(pair(" Tab ", " menu "));
        hints.extend(pair(" q ", " quit "));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_menu(app: &mut App, frame: &mut Frame, area: Rect) {
    let menu_focused = app.focus == FocusPane::Menu;
    let border_color = if menu_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Menu ");

    let items: Vec<ListItem> = Route::menu()
        .iter()
        .map(|route| {
            let marker = if *route == app.screen { "●" } else { " " };
            ListItem::new(format!(" {} {} ", marker, route.title()))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.menu_state);
}

fn render_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let [welcome_area, services_area] =
        Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);

    let name = app.session.user().map(|u| u.name.clone()).unwrap_or_else(|| "there".to_string());
    let mut welcome_lines = vec![
        Line::from(Span::styled(
            format!("Welcome back, {}", name),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from("Quality healthcare from the comfort of your terminal."),
        Line::default(),
    ];
    if let Some(next) = app.appointments.upcoming().first() {
        welcome_lines.push(Line::from(vec![
            Span::styled("Next appointment: ", Style::default().fg(Color::Yellow).bold()),
            Span::raw(format!("{} ({}) on {}, {}", next.doctor, next.specialty, next.date, next.time)),
        ]));
    } else {
        welcome_lines.push(Line::from(Span::styled(
            "No upcoming appointments.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let welcome = Paragraph::new(welcome_lines)
        .block(Block::default().borders(Borders::ALL).title(" Home "))
        .wrap(Wrap { trim: true });
    frame.render_widget(welcome, welcome_area);

    let items: Vec<ListItem> = HOME_SERVICES
        .iter()
        .map(|(_, title, blurb)| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} ", title),
                    Style::default().fg(Color::Yellow).bold(),
                )),
                Line::from(format!("   {} ", blurb)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Services "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, services_area, &mut app.home_state);
}

fn render_consultations(app: &mut App, frame: &mut Frame, area: Rect) {
    let doctors = app.directory.doctors();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Find a Doctor ({}) ", doctors.len()));

    let items: Vec<ListItem> = doctors
        .iter()
        .map(|doctor| {
            let availability = if doctor.available {
                Span::styled(
                    format!("Available: {}", doctor.next_available),
                    Style::default().fg(Color::Green),
                )
            } else {
                Span::styled(
                    format!("Next available: {}", doctor.next_available),
                    Style::default().fg(Color::DarkGray),
                )
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!(" {} ", doctor.name),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::styled(format!("★ {:.1}", doctor.rating), Style::default().fg(Color::Magenta)),
                ]),
                Line::from(vec![Span::raw(format!("   {}   ", doctor.specialty)), availability]),
                Line::default(),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.doctor_state);
}

fn render_assistant(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let records_tag = if app.attach_context { " [records attached]" } else { "" };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" AI Health Assistant: {}{} ", app.config.model, records_tag));

    let chat_text = if app.chat.is_empty() && !app.chat.is_pending() {
        let mut lines = vec![
            Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        ];
        for line in GREETING.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Try asking:",
            Style::default().fg(Color::DarkGray),
        )));
        for (i, suggestion) in SUGGESTION_PROMPTS.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("  {}. {}", i + 1, suggestion),
                Style::default().fg(Color::DarkGray),
            )));
        }
        Text::from(lines)
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in app.chat.turns() {
            match turn.role {
                Role::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in turn.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    lines.push(Line::default());
                }
                Role::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in sanitize_reply(&turn.content).lines() {
                        lines.push(parse_markdown_line(line));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if app.chat.is_pending() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    render_input(frame, input_area, &app.chat_input, " Ask ('i' to type) ", editing, editing);
}

fn render_symptoms(app: &mut App, frame: &mut Frame, area: Rect) {
    let [form_area, result_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    // Intake form: one boxed input per field, notice line underneath.
    let field_areas = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(form_area);

    for (i, field) in SymptomField::ALL.iter().enumerate() {
        let active = app.symptom_field == *field;
        let editing = active && app.input_mode == InputMode::Editing;
        render_input(
            frame,
            field_areas[i],
            app.symptom_form.field(*field),
            &format!(" {} ", field.label()),
            active,
            editing,
        );
    }

    if let Some(notice) = &app.form_notice {
        let notice = Paragraph::new(notice.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(notice, field_areas[5]);
    }

    // Result panel
    let result_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Preliminary Analysis ");

    let result_text = if app.analysis.is_pending() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Text::from(Line::from(Span::styled(
            format!("Analyzing symptoms{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )))
    } else if let Some(reply) = app.analysis.last_reply() {
        let mut lines: Vec<Line> = Vec::new();
        for line in sanitize_reply(reply).lines() {
            lines.push(parse_markdown_line(line));
        }
        lines.push(Line::default());
        for line in DISCLAIMER.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
        }
        Text::from(lines)
    } else {
        Text::from(Line::from(Span::styled(
            "Fill in the form and press 's' to submit your symptoms.",
            Style::default().fg(Color::DarkGray),
        )))
    };

    let result = Paragraph::new(result_text)
        .block(result_block)
        .wrap(Wrap { trim: true });

    frame.render_widget(result, result_area);
}

fn render_records(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tabs_area, content_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let tab_style = |selected: bool| {
        if selected {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let tabs = Line::from(vec![
        Span::styled(" Records ", tab_style(app.records_tab == RecordsTab::Records)),
        Span::raw(" "),
        Span::styled(" Health Metrics ", tab_style(app.records_tab == RecordsTab::Metrics)),
    ]);
    frame.render_widget(Paragraph::new(tabs), tabs_area);

    match app.records_tab {
        RecordsTab::Records => render_record_list(app, frame, content_area),
        RecordsTab::Metrics => render_metrics(app, frame, content_area),
    }
}

fn render_record_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let records = app.archive.records();

    let items: Vec<ListItem> = records
        .iter()
        .map(|record| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} ", record.title),
                    Style::default().fg(Color::Yellow).bold(),
                )),
                Line::from(format!("   {} · {} ", record.kind.label(), record.date)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Medical Records ({}) ", records.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let detail_text = if let Some(record) =
        app.record_state.selected().and_then(|i| app.archive.records().get(i))
    {
        Text::from(vec![
            Line::from(Span::styled(
                record.title.clone(),
                Style::default().fg(Color::Yellow).bold(),
            )),
            Line::from(format!("{} · {} · {}", record.kind.label(), record.doctor, record.date)),
            Line::default(),
            Line::from(record.summary.clone()),
        ])
    } else {
        Text::from("Select a record to view details")
    };

    let detail = Paragraph::new(detail_text)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });

    frame.render_stateful_widget(list, list_area, &mut app.record_state);
    frame.render_widget(detail, detail_area);
}

fn render_metrics(app: &App, frame: &mut Frame, area: Rect) {
    let metrics = app.archive.metrics();
    if metrics.is_empty() {
        let placeholder = Paragraph::new("No metrics recorded")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Health Metrics "));
        frame.render_widget(placeholder, area);
        return;
    }

    let constraints: Vec<Constraint> =
        metrics.iter().map(|_| Constraint::Ratio(1, metrics.len() as u32)).collect();
    let chunks = Layout::vertical(constraints).split(area);

    for (series, chunk) in metrics.iter().zip(chunks.iter()) {
        let mut lines: Vec<Line> = Vec::new();
        for (i, reading) in series.readings.iter().enumerate() {
            let latest = i + 1 == series.readings.len();
            let style = if latest {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!(" {:<16} {}", reading.date, reading.value),
                style,
            )));
        }

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", series.name, series.unit)),
        );
        frame.render_widget(panel, *chunk);
    }
}

fn render_appointments(app: &mut App, frame: &mut Frame, area: Rect) {
    let [upcoming_area, past_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(8)]).areas(area);

    let upcoming = app.appointments.upcoming();
    let items: Vec<ListItem> = upcoming
        .iter()
        .map(|appointment| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!(" {} · {} ", appointment.doctor, appointment.specialty),
                    Style::default().fg(Color::Yellow).bold(),
                )),
                Line::from(format!(
                    "   {}, {} ({})",
                    appointment.date,
                    appointment.time,
                    appointment.kind.label()
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Upcoming ({}) ", upcoming.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let past_lines: Vec<Line> = app
        .appointments
        .past()
        .iter()
        .map(|appointment| {
            Line::from(Span::styled(
                format!(
                    " {} · {} · {}, {}",
                    appointment.doctor, appointment.specialty, appointment.date, appointment.time
                ),
                Style::default().fg(Color::DarkGray),
            ))
        })
        .collect();

    let past = Paragraph::new(past_lines)
        .block(Block::default().borders(Borders::ALL).title(" Past "));

    frame.render_stateful_widget(list, upcoming_area, &mut app.appointment_state);
    frame.render_widget(past, past_area);
}

fn render_profile(app: &mut App, frame: &mut Frame, area: Rect) {
    if let Some(draft) = app.profile_draft.clone() {
        let field_areas = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

        for (i, field) in ProfileField::ALL.iter().enumerate() {
            let active = app.profile_field == *field;
            render_input(
                frame,
                field_areas[i],
                &draft[i],
                &format!(" {} ", field.label()),
                active,
                active,
            );
        }
        return;
    }

    let rows = [
        (ProfileField::Name, app.profile.name.clone()),
        (ProfileField::Email, app.profile.email.clone()),
        (ProfileField::Phone, app.profile.phone.clone()),
        (ProfileField::Address, app.profile.address.clone()),
    ];

    let mut lines: Vec<Line> = Vec::new();
    for (field, value) in rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<12}", field.label()),
                Style::default().fg(Color::Yellow).bold(),
            ),
            Span::raw(value),
        ]));
        lines.push(Line::default());
    }
    if let Some(user) = app.session.user() {
        lines.push(Line::from(Span::styled(
            format!("Account: {}", user.email),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "Press 'e' to edit, 'o' to sign out.",
        Style::default().fg(Color::DarkGray),
    )));

    let profile = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Profile "))
        .wrap(Wrap { trim: true });
    frame.render_widget(profile, area);
}

fn render_sign_in(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 52.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height.saturating_sub(2));

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Remedy Telehealth ");

    let action = if app.session.is_loaded() {
        Span::styled(
            "[ Press Enter to sign in ]",
            Style::default().bg(Color::Blue).fg(Color::White).bold(),
        )
    } else {
        Span::styled("Loading your session...", Style::default().fg(Color::DarkGray))
    };

    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Sign in to access your health dashboard",
            Style::default().fg(Color::White),
        )),
        Line::default(),
        Line::from(action),
    ]);

    let sign_in = Paragraph::new(text)
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(sign_in, popup_area);
}

fn render_not_found(frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled("404", Style::default().fg(Color::Red).bold())),
        Line::default(),
        Line::from("The page you are looking for does not exist."),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to return home.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let not_found = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Page Not Found "))
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(not_found, area);
}

fn render_booking_confirm(app: &App, frame: &mut Frame, area: Rect) {
    let Some(doctor) = app.booking_doctor.and_then(|id| app.directory.doctor(id)) else {
        return;
    };

    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 7;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Confirm Booking ");

    let text = Text::from(vec![
        Line::from(vec![
            Span::styled(doctor.name.clone(), Style::default().fg(Color::Yellow).bold()),
            Span::raw(format!("  ({})", doctor.specialty)),
        ]),
        Line::from(format!("Next available: {}", doctor.next_available)),
        Line::default(),
        Line::from(Span::styled(
            "Enter to confirm, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let confirm = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(confirm, popup_area);
}

fn render_toast(toast: &Toast, frame: &mut Frame, area: Rect) {
    let width = 42.min(area.width.saturating_sub(2));
    let height = 4;
    if area.width <= width + 1 || area.height <= height + 1 {
        return;
    }
    let toast_area = Rect::new(area.width - width - 1, 1, width, height);

    frame.render_widget(Clear, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" {} ", toast.title));

    let body = Paragraph::new(toast.body.as_str())
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, toast_area);
}

/// A one-line boxed input with horizontal scrolling so the cursor stays
/// visible.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    field: &InputField,
    title: &str,
    active: bool,
    editing: bool,
) {
    let border_color = if editing {
        Color::Yellow
    } else if active {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = field.cursor();

    // Scroll so the cursor stays in view
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String =
        field.value().chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn bold_markup_becomes_a_styled_span() {
        let line = parse_markdown_line("take **two tablets** daily");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content.as_ref(), "two tablets");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(plain_text(&line), "take two tablets daily");
    }

    #[test]
    fn unclosed_bold_marker_stays_literal() {
        let line = parse_markdown_line("a **dangling marker");
        assert_eq!(plain_text(&line), "a **dangling marker");
    }

    #[test]
    fn single_asterisks_stay_literal() {
        let line = parse_markdown_line("2 * 3 = 6");
        assert_eq!(plain_text(&line), "2 * 3 = 6");
    }

    #[test]
    fn sanitize_strips_control_characters_but_keeps_newlines() {
        let raw = "line one\n\x1b[2Jline two\r\x07";
        assert_eq!(sanitize_reply(raw), "line one\n[2Jline two");
    }
}
