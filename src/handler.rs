use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FocusPane, InputField, InputMode, RecordsTab, HOME_SERVICES};
use crate::route::Route;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // The booking confirmation swallows every key until answered.
    if app.booking_doctor.is_some() {
        handle_booking_popup(app, key);
        return;
    }

    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }

    let screen = app.active_screen();

    // Sign-in and not-found render without the sidebar, so pane focus
    // does not apply there.
    match screen {
        Route::SignIn => {
            handle_sign_in(app, key);
            return;
        }
        Route::NotFound => {
            handle_not_found(app, key);
            return;
        }
        _ => {}
    }

    // Tab to switch focus between the sidebar and the screen
    if key.code == KeyCode::Tab {
        app.focus = match app.focus {
            FocusPane::Menu => FocusPane::Content,
            FocusPane::Content => FocusPane::Menu,
        };
        return;
    }

    if app.focus == FocusPane::Menu {
        handle_menu(app, key);
        return;
    }

    match screen {
        Route::Home => handle_home_normal(app, key),
        Route::Assistant => handle_assistant_normal(app, key),
        Route::Symptoms => handle_symptoms_normal(app, key),
        Route::Consultations => handle_consultations_normal(app, key),
        Route::Records => handle_records_normal(app, key),
        Route::Appointments => handle_appointments_normal(app, key),
        Route::Profile => handle_profile_normal(app, key),
        Route::SignIn | Route::NotFound => {}
    }
}

fn handle_menu(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.menu_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.menu_nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            let route = app.menu_selected_route();
            app.navigate(route);
        }
        _ => {}
    }
}

fn handle_sign_in(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Char('s')) {
        app.sign_in();
    }
}

fn handle_not_found(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Char('h')) {
        app.navigate(Route::Home);
    }
}

fn handle_home_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            App::list_nav_down(&mut app.home_state, HOME_SERVICES.len());
        }
        KeyCode::Char('k') | KeyCode::Up => App::list_nav_up(&mut app.home_state),
        KeyCode::Enter => {
            let index = app.home_state.selected().unwrap_or(0);
            if let Some((route, _, _)) = HOME_SERVICES.get(index) {
                app.navigate(*route);
            }
        }
        _ => {}
    }
}

fn handle_assistant_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Enter the input
        KeyCode::Char('i') | KeyCode::Char('e') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Toggle sending health records along with the next question
        KeyCode::Char('x') => app.attach_context = !app.attach_context,

        // Scroll the chat log
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),

        // Suggested questions, offered while the log is still empty
        KeyCode::Char(c @ '1'..='4') if app.chat.is_empty() && !app.chat.is_pending() => {
            let index = (c as usize) - ('1' as usize);
            app.pick_suggestion(index);
        }

        _ => {}
    }
}

fn handle_symptoms_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.symptom_field = app.symptom_field.next(),
        KeyCode::Char('k') | KeyCode::Up => app.symptom_field = app.symptom_field.prev(),
        KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('e') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('s') => app.submit_symptom_report(),
        KeyCode::Char('n') => app.reset_symptom_intake(),
        _ => {}
    }
}

fn handle_consultations_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            App::list_nav_down(&mut app.doctor_state, app.directory.doctors().len());
        }
        KeyCode::Char('k') | KeyCode::Up => App::list_nav_up(&mut app.doctor_state),
        KeyCode::Enter => app.request_booking(),
        _ => {}
    }
}

fn handle_records_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.records_tab = RecordsTab::Records,
        KeyCode::Char('l') | KeyCode::Right => app.records_tab = RecordsTab::Metrics,
        KeyCode::Char('j') | KeyCode::Down if app.records_tab == RecordsTab::Records => {
            App::list_nav_down(&mut app.record_state, app.archive.records().len());
        }
        KeyCode::Char('k') | KeyCode::Up if app.records_tab == RecordsTab::Records => {
            App::list_nav_up(&mut app.record_state);
        }
        _ => {}
    }
}

fn handle_appointments_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            App::list_nav_down(&mut app.appointment_state, app.appointments.upcoming().len());
        }
        KeyCode::Char('k') | KeyCode::Up => App::list_nav_up(&mut app.appointment_state),
        KeyCode::Enter => app.join_selected_appointment(),
        KeyCode::Char('c') => app.cancel_selected_appointment(),
        _ => {}
    }
}

fn handle_profile_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.begin_profile_edit(),
        KeyCode::Char('o') => app.sign_out(),
        _ => {}
    }
}

fn handle_booking_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => app.confirm_booking(),
        KeyCode::Esc | KeyCode::Char('n') => app.booking_doctor = None,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.active_screen() {
        Route::Assistant => handle_assistant_editing(app, key),
        Route::Symptoms => handle_symptoms_editing(app, key),
        Route::Profile => handle_profile_editing(app, key),
        // No other screen has an editable field.
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_assistant_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_chat(),
        _ => edit_field(key, &mut app.chat_input),
    }
}

fn handle_symptoms_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
            app.symptom_field = app.symptom_field.next();
        }
        KeyCode::BackTab | KeyCode::Up => app.symptom_field = app.symptom_field.prev(),
        _ => edit_field(key, app.symptom_form.field_mut(app.symptom_field)),
    }
}

fn handle_profile_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.discard_profile_edit(),
        KeyCode::Enter => app.save_profile_edit(),
        KeyCode::Tab | KeyCode::Down => app.profile_field = app.profile_field.next(),
        KeyCode::BackTab | KeyCode::Up => app.profile_field = app.profile_field.prev(),
        _ => {
            if let Some(field) = app.profile_draft_field_mut() {
                edit_field(key, field);
            }
        }
    }
}

fn edit_field(key: KeyEvent, field: &mut InputField) {
    match key.code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SUGGESTION_PROMPTS;
    use crate::clinic::{InMemoryAppointmentBook, StaticDoctorDirectory, StaticRecordArchive};
    use crate::config::{ApiCredential, Config};
    use crate::gateway::AiGateway;
    use crate::session::PlaceholderIdentity;

    fn signed_in_app(start: Route) -> App {
        let mut app = signed_out_app(start);
        app.sign_in();
        app.toast = None;
        app
    }

    fn signed_out_app(start: Route) -> App {
        let gateway = AiGateway::with_base_url(
            ApiCredential::for_tests("test-key"),
            "gemini-1.5-flash",
            "http://localhost:0",
        );
        App::new(
            Config::new(),
            gateway,
            Box::new(PlaceholderIdentity),
            Box::new(StaticDoctorDirectory::new()),
            Box::new(InMemoryAppointmentBook::new()),
            Box::new(StaticRecordArchive::new()),
            start,
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn q_quits_in_normal_mode_but_types_in_editing_mode() {
        let mut app = signed_in_app(Route::Assistant);
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.chat_input.value(), "q");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn tab_toggles_between_menu_and_screen() {
        let mut app = signed_in_app(Route::Home);
        assert_eq!(app.focus, FocusPane::Content);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Menu);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Content);
    }

    #[test]
    fn menu_enter_switches_screens_and_returns_focus() {
        let mut app = signed_in_app(Route::Home);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Route::Consultations);
        assert_eq!(app.focus, FocusPane::Content);
    }

    #[test]
    fn suggestion_keys_fill_the_chat_input() {
        let mut app = signed_in_app(Route::Assistant);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.chat_input.value(), SUGGESTION_PROMPTS[1]);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn symptom_fields_cycle_with_tab_while_editing() {
        let mut app = signed_in_app(Route::Symptoms);
        press(&mut app, KeyCode::Char('i'));
        for c in "fever".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        for c in "2 days".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.symptom_form.main_symptom.value(), "fever");
        assert_eq!(app.symptom_form.duration.value(), "2 days");
    }

    #[test]
    fn booking_popup_swallows_keys_until_answered() {
        let mut app = signed_in_app(Route::Consultations);
        app.doctor_state.select(Some(0));
        press(&mut app, KeyCode::Enter);
        assert!(app.booking_doctor.is_some());

        // 'q' does not quit while the confirmation is open.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(app.booking_doctor.is_some());

        press(&mut app, KeyCode::Esc);
        assert!(app.booking_doctor.is_none());
        assert_eq!(app.appointments.upcoming().len(), 2);
    }

    #[test]
    fn sign_in_screen_enter_starts_a_session() {
        let mut app = signed_out_app(Route::Home);
        assert_eq!(app.active_screen(), Route::SignIn);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.active_screen(), Route::Home);
    }

    #[test]
    fn profile_edit_keys_write_through_to_the_draft() {
        let mut app = signed_in_app(Route::Profile);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::End);
        for c in " Jr.".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.profile.name, "John Doe Jr.");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn records_screen_switches_tabs_with_h_and_l() {
        let mut app = signed_in_app(Route::Records);
        assert_eq!(app.records_tab, RecordsTab::Records);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.records_tab, RecordsTab::Metrics);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.records_tab, RecordsTab::Records);
    }

    #[test]
    fn cancelling_the_last_appointment_clears_the_selection() {
        let mut app = signed_in_app(Route::Appointments);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.appointments.upcoming().is_empty());
        assert!(app.appointment_state.selected().is_none());

        // Cancelling with nothing left is a no-op.
        press(&mut app, KeyCode::Char('c'));
        assert!(app.appointments.upcoming().is_empty());
    }
}
