use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::clinic::{AppointmentBook, DoctorDirectory, PatientProfile, RecordArchive};
use crate::config::Config;
use crate::conversation::Conversation;
use crate::gateway::{AiGateway, FALLBACK_REPLY};
use crate::prompt::{self, SymptomReport};
use crate::route::Route;
use crate::session::{IdentityProvider, Session};

/// Canned questions offered while the chat log is still empty.
pub const SUGGESTION_PROMPTS: [&str; 4] = [
    "What causes headaches?",
    "How can I treat a common cold?",
    "Tips for better sleep",
    "When should I see a doctor about chest pain?",
];

/// Quick links shown on the home screen: route, card title, blurb.
pub const HOME_SERVICES: [(Route, &str, &str); 4] = [
    (Route::Assistant, "AI Health Assistant", "Ask health questions and get instant answers"),
    (Route::Symptoms, "Report Symptoms", "Describe symptoms for a preliminary analysis"),
    (Route::Consultations, "Consultations", "Book a video visit with a doctor"),
    (Route::Records, "Medical Records", "Review your records and health metrics"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Menu,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordsTab {
    #[default]
    Records,
    Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymptomField {
    MainSymptom,
    Duration,
    Temperature,
    AdditionalSymptoms,
    Medications,
}

impl SymptomField {
    pub const ALL: [SymptomField; 5] = [
        SymptomField::MainSymptom,
        SymptomField::Duration,
        SymptomField::Temperature,
        SymptomField::AdditionalSymptoms,
        SymptomField::Medications,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SymptomField::MainSymptom => "Main symptom",
            SymptomField::Duration => "Duration",
            SymptomField::Temperature => "Temperature (optional)",
            SymptomField::AdditionalSymptoms => "Additional symptoms (optional)",
            SymptomField::Medications => "Current medications (optional)",
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Address,
}

impl ProfileField {
    pub const ALL: [ProfileField; 4] =
        [ProfileField::Name, ProfileField::Email, ProfileField::Phone, ProfileField::Address];

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Name => "Full name",
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone",
            ProfileField::Address => "Address",
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A single-line text input with a character-indexed cursor.
///
/// The cursor counts characters, not bytes, so edits stay on UTF-8
/// boundaries regardless of what the terminal delivers.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let at = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Replace the contents, cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.value = text.to_string();
        self.cursor = self.value.chars().count();
    }
}

fn char_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map(|(i, _)| i).unwrap_or(s.len())
}

/// The symptom intake form as the user fills it in.
#[derive(Debug, Clone, Default)]
pub struct SymptomForm {
    pub main_symptom: InputField,
    pub duration: InputField,
    pub temperature: InputField,
    pub additional_symptoms: InputField,
    pub medications: InputField,
}

impl SymptomForm {
    pub fn field(&self, field: SymptomField) -> &InputField {
        match field {
            SymptomField::MainSymptom => &self.main_symptom,
            SymptomField::Duration => &self.duration,
            SymptomField::Temperature => &self.temperature,
            SymptomField::AdditionalSymptoms => &self.additional_symptoms,
            SymptomField::Medications => &self.medications,
        }
    }

    pub fn field_mut(&mut self, field: SymptomField) -> &mut InputField {
        match field {
            SymptomField::MainSymptom => &mut self.main_symptom,
            SymptomField::Duration => &mut self.duration,
            SymptomField::Temperature => &mut self.temperature,
            SymptomField::AdditionalSymptoms => &mut self.additional_symptoms,
            SymptomField::Medications => &mut self.medications,
        }
    }

    /// Snapshot the form; blank optional fields become `None`.
    pub fn to_report(&self) -> SymptomReport {
        fn optional(field: &InputField) -> Option<String> {
            let value = field.value().trim();
            if value.is_empty() { None } else { Some(value.to_string()) }
        }
        SymptomReport {
            main_symptom: self.main_symptom.value().trim().to_string(),
            duration: self.duration.value().trim().to_string(),
            temperature: optional(&self.temperature),
            additional_symptoms: optional(&self.additional_symptoms),
            medications: optional(&self.medications),
        }
    }
}

/// A transient notification pinned to the top-right corner.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub ttl: u8,
}

// ~3 seconds at the 300ms tick rate.
const TOAST_TICKS: u8 = 10;

impl Toast {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into(), ttl: TOAST_TICKS }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Route,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Collaborators, injected at the composition root
    pub session: Session,
    pub identity: Box<dyn IdentityProvider>,
    pub gateway: AiGateway,
    pub directory: Box<dyn DoctorDirectory>,
    pub appointments: Box<dyn AppointmentBook>,
    pub archive: Box<dyn RecordArchive>,
    pub config: Config,

    // Sidebar
    pub menu_state: ListState,

    // Assistant screen
    pub chat: Conversation,
    pub chat_input: InputField,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_task: Option<JoinHandle<String>>,
    pub attach_context: bool,

    // Symptom intake screen
    pub symptom_form: SymptomForm,
    pub symptom_field: SymptomField,
    pub form_notice: Option<String>,
    pub analysis: Conversation,
    pub analysis_task: Option<JoinHandle<String>>,

    // Consultations screen
    pub doctor_state: ListState,
    pub booking_doctor: Option<u32>,

    // Appointments screen
    pub appointment_state: ListState,

    // Records screen
    pub records_tab: RecordsTab,
    pub record_state: ListState,

    // Home screen
    pub home_state: ListState,

    // Profile screen
    pub profile: PatientProfile,
    pub profile_draft: Option<[InputField; 4]>,
    pub profile_field: ProfileField,

    // Chrome
    pub toast: Option<Toast>,
    pub animation_frame: u8,
}

impl App {
    pub fn new(
        config: Config,
        gateway: AiGateway,
        identity: Box<dyn IdentityProvider>,
        directory: Box<dyn DoctorDirectory>,
        appointments: Box<dyn AppointmentBook>,
        archive: Box<dyn RecordArchive>,
        start: Route,
    ) -> Self {
        let mut session = Session::loading();
        session.resolve(identity.as_ref());

        let mut menu_state = ListState::default();
        menu_state.select(Route::menu().iter().position(|r| *r == start).or(Some(0)));
        let mut doctor_state = ListState::default();
        doctor_state.select(Some(0));
        let mut appointment_state = ListState::default();
        appointment_state.select(Some(0));
        let mut record_state = ListState::default();
        record_state.select(Some(0));
        let mut home_state = ListState::default();
        home_state.select(Some(0));

        Self {
            should_quit: false,
            screen: start,
            input_mode: InputMode::Normal,
            focus: FocusPane::Content,

            session,
            identity,
            gateway,
            directory,
            appointments,
            archive,
            config,

            menu_state,

            chat: Conversation::new(),
            chat_input: InputField::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: None,
            attach_context: false,

            symptom_form: SymptomForm::default(),
            symptom_field: SymptomField::MainSymptom,
            form_notice: None,
            analysis: Conversation::new(),
            analysis_task: None,

            doctor_state,
            booking_doctor: None,

            appointment_state,

            records_tab: RecordsTab::default(),
            record_state,

            home_state,

            profile: PatientProfile::placeholder(),
            profile_draft: None,
            profile_field: ProfileField::Name,

            toast: None,
            animation_frame: 0,
        }
    }

    /// The screen to render and dispatch on. Every dashboard screen is
    /// protected: without a signed-in session it resolves to the sign-in
    /// screen, and the requested screen is kept for after sign-in.
    pub fn active_screen(&self) -> Route {
        let protected = !matches!(self.screen, Route::SignIn | Route::NotFound);
        if protected && !self.session.is_signed_in() {
            Route::SignIn
        } else {
            self.screen
        }
    }

    pub fn navigate(&mut self, route: Route) {
        self.screen = route;
        if let Some(pos) = Route::menu().iter().position(|r| *r == route) {
            self.menu_state.select(Some(pos));
        }
        self.focus = FocusPane::Content;
        self.input_mode = InputMode::Normal;
    }

    pub fn sign_in(&mut self) {
        self.session.sign_in(self.identity.as_ref());
        if self.session.is_signed_in() {
            if self.screen == Route::SignIn {
                self.screen = Route::Home;
            }
            let name = self.session.user().map(|u| u.name.clone()).unwrap_or_default();
            self.toast = Some(Toast::new("Signed In", format!("Welcome back, {name}.")));
        }
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
        self.profile_draft = None;
        self.input_mode = InputMode::Normal;
        self.toast = Some(Toast::new("Signed Out", "Your session has ended."));
    }

    // --- assistant ---

    /// Submit the chat input. Appends the user turn and spawns the gateway
    /// call; rejected submissions (empty input, request already in flight)
    /// change nothing.
    pub fn submit_chat(&mut self) {
        let input = self.chat_input.value().to_string();
        if self.chat.submit(&input).is_err() {
            return;
        }

        let context = if self.attach_context { Some(self.archive.health_context()) } else { None };
        let prompt = prompt::compose_query(&input, context.as_ref());
        self.chat_input.clear();
        self.input_mode = InputMode::Normal;
        // Scroll so the thinking indicator is visible.
        self.scroll_chat_to_bottom();

        let gateway = self.gateway.clone();
        self.chat_task = Some(tokio::spawn(async move { gateway.send(&prompt).await }));
    }

    /// Validate and submit the symptom form as a one-shot analysis.
    ///
    /// Each submission starts a fresh request/response pair; the previous
    /// analysis is replaced, never mutated.
    pub fn submit_symptom_report(&mut self) {
        if self.analysis.is_pending() {
            return;
        }
        let report = self.symptom_form.to_report();
        if let Err(err) = report.validate() {
            self.form_notice = Some(err.to_string());
            return;
        }
        self.form_notice = None;

        let prompt = prompt::compose_symptom_report(&report);
        let mut analysis = Conversation::new();
        if analysis.submit(&prompt).is_err() {
            return;
        }
        self.analysis = analysis;

        let gateway = self.gateway.clone();
        self.analysis_task = Some(tokio::spawn(async move { gateway.send(&prompt).await }));
    }

    /// Clear the form and the previous analysis for a new intake.
    pub fn reset_symptom_intake(&mut self) {
        if self.analysis.is_pending() {
            return;
        }
        self.symptom_form = SymptomForm::default();
        self.symptom_field = SymptomField::MainSymptom;
        self.form_notice = None;
        self.analysis = Conversation::new();
    }

    /// Settle any finished gateway task. Called by the event loop on every
    /// pass; a settled task always returns its conversation to idle.
    pub async fn poll_replies(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                let reply = finish(task).await;
                self.chat.settle(reply);
                self.scroll_chat_to_bottom();
                tracing::debug!(turns = self.chat.len(), "chat reply settled");
            }
        }
        if self.analysis_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.analysis_task.take() {
                let reply = finish(task).await;
                self.analysis.settle(reply);
                self.toast = Some(Toast::new(
                    "Symptoms Submitted",
                    "Your symptoms have been analyzed by our AI system.",
                ));
            }
        }
    }

    /// Load a canned suggestion into the input for editing.
    pub fn pick_suggestion(&mut self, index: usize) {
        if let Some(text) = SUGGESTION_PROMPTS.get(index) {
            self.chat_input.set(text);
            self.input_mode = InputMode::Editing;
        }
    }

    // --- consultations ---

    pub fn selected_doctor_id(&self) -> Option<u32> {
        self.doctor_state
            .selected()
            .and_then(|i| self.directory.doctors().get(i))
            .map(|doctor| doctor.id)
    }

    /// Open the booking confirmation for the selected doctor, or explain
    /// why it cannot be booked.
    pub fn request_booking(&mut self) {
        let Some(id) = self.selected_doctor_id() else { return };
        let Some(doctor) = self.directory.doctor(id) else { return };
        if doctor.available {
            self.booking_doctor = Some(id);
        } else {
            self.toast = Some(Toast::new(
                "Doctor Unavailable",
                format!("{} is not taking consultations right now.", doctor.name),
            ));
        }
    }

    pub fn confirm_booking(&mut self) {
        let Some(id) = self.booking_doctor.take() else { return };
        let Some(doctor) = self.directory.doctor(id).cloned() else { return };
        let appointment = self.appointments.book(&doctor);
        self.toast = Some(Toast::new(
            "Consultation Booked",
            format!(
                "Your consultation with {} is scheduled for {}, {}.",
                appointment.doctor, appointment.date, appointment.time
            ),
        ));
    }

    // --- appointments ---

    pub fn cancel_selected_appointment(&mut self) {
        let Some(index) = self.appointment_state.selected() else { return };
        let Some(id) = self.appointments.upcoming().get(index).map(|a| a.id) else { return };
        if let Some(cancelled) = self.appointments.cancel(id) {
            self.toast = Some(Toast::new(
                "Appointment Cancelled",
                format!("Your appointment with {} has been cancelled.", cancelled.doctor),
            ));
            let remaining = self.appointments.upcoming().len();
            if remaining == 0 {
                self.appointment_state.select(None);
            } else if index >= remaining {
                self.appointment_state.select(Some(remaining - 1));
            }
        }
    }

    pub fn join_selected_appointment(&mut self) {
        let Some(index) = self.appointment_state.selected() else { return };
        let Some(appointment) = self.appointments.upcoming().get(index) else { return };
        let toast = match appointment.kind {
            crate::clinic::VisitKind::Video => Toast::new(
                "Joining Video Call",
                format!("Connecting you with {}...", appointment.doctor),
            ),
            _ => Toast::new(
                "Not a Video Visit",
                "Only video consultations can be joined from here.",
            ),
        };
        self.toast = Some(toast);
    }

    // --- profile ---

    pub fn begin_profile_edit(&mut self) {
        let mut fields: [InputField; 4] = Default::default();
        fields[0].set(&self.profile.name);
        fields[1].set(&self.profile.email);
        fields[2].set(&self.profile.phone);
        fields[3].set(&self.profile.address);
        self.profile_draft = Some(fields);
        self.profile_field = ProfileField::Name;
        self.input_mode = InputMode::Editing;
    }

    pub fn save_profile_edit(&mut self) {
        if let Some(fields) = self.profile_draft.take() {
            self.profile = PatientProfile {
                name: fields[0].value().to_string(),
                email: fields[1].value().to_string(),
                phone: fields[2].value().to_string(),
                address: fields[3].value().to_string(),
            };
            self.toast = Some(Toast::new(
                "Profile Updated",
                "Your profile information has been updated successfully.",
            ));
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn discard_profile_edit(&mut self) {
        self.profile_draft = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn profile_draft_field_mut(&mut self) -> Option<&mut InputField> {
        let index = ProfileField::ALL.iter().position(|f| *f == self.profile_field)?;
        self.profile_draft.as_mut().map(|fields| &mut fields[index])
    }

    // --- list navigation ---

    pub fn menu_nav_down(&mut self) {
        let len = Route::menu().len();
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn menu_nav_up(&mut self) {
        let i = self.menu_state.selected().unwrap_or(0);
        self.menu_state.select(Some(i.saturating_sub(1)));
    }

    pub fn menu_selected_route(&self) -> Route {
        Route::menu()[self.menu_state.selected().unwrap_or(0).min(Route::menu().len() - 1)]
    }

    pub fn list_nav_down(state: &mut ListState, len: usize) {
        if len > 0 {
            let i = state.selected().unwrap_or(0);
            state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn list_nav_up(state: &mut ListState) {
        let i = state.selected().unwrap_or(0);
        state.select(Some(i.saturating_sub(1)));
    }

    // --- chat scrolling ---

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Pin the chat viewport to the newest turn, accounting for wrapping.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total_lines: u16 = 0;
        for turn in self.chat.turns() {
            total_lines += 1; // role label line
            for line in turn.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // blank line after each turn
        }
        if self.chat.is_pending() {
            total_lines += 2; // label + thinking indicator
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Advance the thinking animation and expire the toast.
    pub fn tick(&mut self) {
        if self.chat.is_pending() || self.analysis.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(toast) = &mut self.toast {
            toast.ttl = toast.ttl.saturating_sub(1);
            if toast.ttl == 0 {
                self.toast = None;
            }
        }
    }
}

async fn finish(task: JoinHandle<String>) -> String {
    match task.await {
        Ok(reply) => reply,
        // The task only aborts if the send future panicked; the
        // conversation still has to settle.
        Err(error) => {
            tracing::error!(%error, "assistant task aborted");
            FALLBACK_REPLY.to_string()
        }
    }
}
