//! Clinic data model and the contracts the dashboard consumes.
//!
//! Everything here is hardcoded, fictional placeholder data standing in for
//! a real clinical backend. The traits are the seam: screens only ever see
//! `DoctorDirectory`, `AppointmentBook` and `RecordArchive`, so the static
//! implementations can be swapped for a real data service later without
//! touching the UI.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub rating: f32,
    pub available: bool,
    pub next_available: String,
}

/// How a visit is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitKind {
    Video,
    Phone,
    InPerson,
}

impl VisitKind {
    pub fn label(&self) -> &'static str {
        match self {
            VisitKind::Video => "video",
            VisitKind::Phone => "phone",
            VisitKind::InPerson => "in-person",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u32,
    pub doctor: String,
    pub specialty: String,
    pub date: String,
    pub time: String,
    pub kind: VisitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Examination,
    Vaccination,
    Consultation,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Examination => "Examination",
            RecordKind::Vaccination => "Vaccination",
            RecordKind::Consultation => "Consultation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: u32,
    pub title: String,
    pub doctor: String,
    pub date: String,
    pub kind: RecordKind,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReading {
    pub date: String,
    pub value: String,
}

/// One tracked health metric and its reading history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub unit: String,
    pub readings: Vec<MetricReading>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl PatientProfile {
    pub fn placeholder() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "1234567890".to_string(),
            address: "123 Main Street, Anytown, USA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalSigns {
    pub blood_pressure: String,
    pub heart_rate: String,
    pub blood_sugar: String,
}

/// Patient data attached to an assistant request. Built fresh for every
/// call and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthContext {
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
    pub vitals: Option<VitalSigns>,
    pub last_checkup: Option<String>,
}

pub trait DoctorDirectory {
    fn doctors(&self) -> &[Doctor];
    fn doctor(&self, id: u32) -> Option<&Doctor>;
}

pub trait AppointmentBook {
    fn upcoming(&self) -> &[Appointment];
    fn past(&self) -> &[Appointment];
    /// Schedule a consultation in the doctor's next open slot.
    fn book(&mut self, doctor: &Doctor) -> Appointment;
    /// Remove an upcoming appointment. Past visits cannot be cancelled.
    fn cancel(&mut self, id: u32) -> Option<Appointment>;
}

pub trait RecordArchive {
    fn records(&self) -> &[MedicalRecord];
    fn metrics(&self) -> &[MetricSeries];
    /// Assemble the patient's health context from the archive.
    fn health_context(&self) -> HealthContext;
}

pub struct StaticDoctorDirectory {
    doctors: Vec<Doctor>,
}

impl StaticDoctorDirectory {
    pub fn new() -> Self {
        Self {
            doctors: vec![
                Doctor {
                    id: 1,
                    name: "Dr. Sarah Johnson".to_string(),
                    specialty: "General Medicine".to_string(),
                    rating: 4.9,
                    available: true,
                    next_available: "Today, 2:00 PM".to_string(),
                },
                Doctor {
                    id: 2,
                    name: "Dr. Michael Chen".to_string(),
                    specialty: "Cardiology".to_string(),
                    rating: 4.8,
                    available: false,
                    next_available: "Tomorrow, 10:00 AM".to_string(),
                },
                Doctor {
                    id: 3,
                    name: "Dr. Emily Rodriguez".to_string(),
                    specialty: "Pediatrics".to_string(),
                    rating: 4.7,
                    available: true,
                    next_available: "Today, 4:30 PM".to_string(),
                },
                Doctor {
                    id: 4,
                    name: "Dr. David Patel".to_string(),
                    specialty: "Dermatology".to_string(),
                    rating: 4.9,
                    available: false,
                    next_available: "Friday, 11:15 AM".to_string(),
                },
            ],
        }
    }
}

impl Default for StaticDoctorDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DoctorDirectory for StaticDoctorDirectory {
    fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    fn doctor(&self, id: u32) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }
}

pub struct InMemoryAppointmentBook {
    upcoming: Vec<Appointment>,
    past: Vec<Appointment>,
    next_id: u32,
}

impl InMemoryAppointmentBook {
    pub fn new() -> Self {
        Self {
            upcoming: vec![
                Appointment {
                    id: 1,
                    doctor: "Dr. Sarah Johnson".to_string(),
                    specialty: "General Medicine".to_string(),
                    date: "April 28, 2024".to_string(),
                    time: "10:00 AM".to_string(),
                    kind: VisitKind::Video,
                },
                Appointment {
                    id: 2,
                    doctor: "Dr. David Patel".to_string(),
                    specialty: "Dermatology".to_string(),
                    date: "May 5, 2024".to_string(),
                    time: "2:30 PM".to_string(),
                    kind: VisitKind::InPerson,
                },
            ],
            past: vec![
                Appointment {
                    id: 3,
                    doctor: "Dr. Emily Rodriguez".to_string(),
                    specialty: "Pediatrics".to_string(),
                    date: "March 15, 2024".to_string(),
                    time: "9:15 AM".to_string(),
                    kind: VisitKind::Phone,
                },
                Appointment {
                    id: 4,
                    doctor: "Dr. Michael Chen".to_string(),
                    specialty: "Cardiology".to_string(),
                    date: "February 22, 2024".to_string(),
                    time: "11:45 AM".to_string(),
                    kind: VisitKind::Video,
                },
            ],
            next_id: 5,
        }
    }
}

impl Default for InMemoryAppointmentBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentBook for InMemoryAppointmentBook {
    fn upcoming(&self) -> &[Appointment] {
        &self.upcoming
    }

    fn past(&self) -> &[Appointment] {
        &self.past
    }

    fn book(&mut self, doctor: &Doctor) -> Appointment {
        let (date, time) = doctor
            .next_available
            .split_once(", ")
            .unwrap_or((doctor.next_available.as_str(), ""));
        let appointment = Appointment {
            id: self.next_id,
            doctor: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            date: date.to_string(),
            time: time.to_string(),
            kind: VisitKind::Video,
        };
        self.next_id += 1;
        self.upcoming.push(appointment.clone());
        appointment
    }

    fn cancel(&mut self, id: u32) -> Option<Appointment> {
        let index = self.upcoming.iter().position(|a| a.id == id)?;
        Some(self.upcoming.remove(index))
    }
}

pub struct StaticRecordArchive {
    records: Vec<MedicalRecord>,
    metrics: Vec<MetricSeries>,
}

impl StaticRecordArchive {
    pub fn new() -> Self {
        Self {
            records: vec![
                MedicalRecord {
                    id: 1,
                    title: "Annual Physical Examination".to_string(),
                    doctor: "Dr. Sarah Johnson".to_string(),
                    date: "March 15, 2024".to_string(),
                    kind: RecordKind::Examination,
                    summary: "Routine annual physical examination with blood work and vitals \
                              check. All results within normal ranges."
                        .to_string(),
                },
                MedicalRecord {
                    id: 2,
                    title: "COVID-19 Vaccination".to_string(),
                    doctor: "Dr. Michael Chen".to_string(),
                    date: "January 10, 2024".to_string(),
                    kind: RecordKind::Vaccination,
                    summary: "COVID-19 booster administered. No adverse reactions observed."
                        .to_string(),
                },
                MedicalRecord {
                    id: 3,
                    title: "Allergy Consultation".to_string(),
                    doctor: "Dr. Emily Rodriguez".to_string(),
                    date: "November 5, 2023".to_string(),
                    kind: RecordKind::Consultation,
                    summary: "Confirmed penicillin allergy. Loratadine prescribed for seasonal \
                              symptoms."
                        .to_string(),
                },
            ],
            metrics: vec![
                MetricSeries {
                    name: "Blood pressure".to_string(),
                    unit: "mmHg".to_string(),
                    readings: readings(&[
                        ("Apr 10", "120/80"),
                        ("Apr 15", "118/78"),
                        ("Apr 20", "122/82"),
                        ("Apr 25", "119/79"),
                    ]),
                },
                MetricSeries {
                    name: "Heart rate".to_string(),
                    unit: "bpm".to_string(),
                    readings: readings(&[
                        ("Apr 10", "72"),
                        ("Apr 15", "68"),
                        ("Apr 20", "74"),
                        ("Apr 25", "70"),
                    ]),
                },
                MetricSeries {
                    name: "Blood sugar".to_string(),
                    unit: "mg/dL".to_string(),
                    readings: readings(&[
                        ("Apr 10", "92"),
                        ("Apr 15", "94"),
                        ("Apr 20", "90"),
                        ("Apr 25", "91"),
                    ]),
                },
            ],
        }
    }

    fn latest(&self, metric: &str) -> Option<String> {
        self.metrics
            .iter()
            .find(|series| series.name == metric)
            .and_then(|series| series.readings.last())
            .map(|reading| reading.value.clone())
    }
}

impl Default for StaticRecordArchive {
    fn default() -> Self {
        Self::new()
    }
}

fn readings(pairs: &[(&str, &str)]) -> Vec<MetricReading> {
    pairs
        .iter()
        .map(|(date, value)| MetricReading { date: date.to_string(), value: value.to_string() })
        .collect()
}

impl RecordArchive for StaticRecordArchive {
    fn records(&self) -> &[MedicalRecord] {
        &self.records
    }

    fn metrics(&self) -> &[MetricSeries] {
        &self.metrics
    }

    fn health_context(&self) -> HealthContext {
        let vitals = match (
            self.latest("Blood pressure"),
            self.latest("Heart rate"),
            self.latest("Blood sugar"),
        ) {
            (Some(blood_pressure), Some(heart_rate), Some(blood_sugar)) => {
                Some(VitalSigns { blood_pressure, heart_rate, blood_sugar })
            }
            _ => None,
        };
        let last_checkup = self
            .records
            .iter()
            .find(|record| record.kind == RecordKind::Examination)
            .map(|record| record.date.clone());

        HealthContext {
            allergies: vec!["Penicillin".to_string()],
            conditions: Vec::new(),
            medications: vec!["Loratadine 10mg".to_string()],
            vitals,
            last_checkup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_serves_lookups_by_id() {
        let directory = StaticDoctorDirectory::new();
        assert_eq!(directory.doctors().len(), 4);

        let doctor = directory.doctor(3).unwrap();
        assert_eq!(doctor.name, "Dr. Emily Rodriguez");
        assert_eq!(doctor.specialty, "Pediatrics");
        assert!(directory.doctor(99).is_none());
    }

    #[test]
    fn booking_appends_an_upcoming_appointment() {
        let directory = StaticDoctorDirectory::new();
        let mut book = InMemoryAppointmentBook::new();
        let before = book.upcoming().len();

        let doctor = directory.doctor(1).unwrap();
        let appointment = book.book(doctor);

        assert_eq!(book.upcoming().len(), before + 1);
        assert_eq!(appointment.doctor, "Dr. Sarah Johnson");
        assert_eq!(appointment.date, "Today");
        assert_eq!(appointment.time, "2:00 PM");
        assert_eq!(appointment.kind, VisitKind::Video);
    }

    #[test]
    fn booked_ids_do_not_collide() {
        let directory = StaticDoctorDirectory::new();
        let mut book = InMemoryAppointmentBook::new();

        let first = book.book(directory.doctor(1).unwrap());
        let second = book.book(directory.doctor(3).unwrap());
        assert_ne!(first.id, second.id);

        let mut ids: Vec<u32> = book.upcoming().iter().map(|a| a.id).collect();
        ids.extend(book.past().iter().map(|a| a.id));
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), book.upcoming().len() + book.past().len());
    }

    #[test]
    fn cancel_removes_only_the_target_appointment() {
        let mut book = InMemoryAppointmentBook::new();

        let cancelled = book.cancel(1).unwrap();
        assert_eq!(cancelled.doctor, "Dr. Sarah Johnson");
        assert_eq!(book.upcoming().len(), 1);
        assert_eq!(book.upcoming()[0].doctor, "Dr. David Patel");

        assert!(book.cancel(999).is_none());
        assert_eq!(book.past().len(), 2);
    }

    #[test]
    fn health_context_reflects_the_latest_readings() {
        let archive = StaticRecordArchive::new();
        let context = archive.health_context();

        assert!(context.allergies.iter().any(|a| a == "Penicillin"));
        let vitals = context.vitals.unwrap();
        assert_eq!(vitals.blood_pressure, "119/79");
        assert_eq!(vitals.heart_rate, "70");
        assert_eq!(vitals.blood_sugar, "91");
        assert_eq!(context.last_checkup.as_deref(), Some("March 15, 2024"));
    }

    #[test]
    fn archive_is_seeded_with_records_and_metrics() {
        let archive = StaticRecordArchive::new();
        assert_eq!(archive.records().len(), 3);
        assert_eq!(archive.metrics().len(), 3);
        assert!(archive.metrics().iter().all(|series| series.readings.len() == 4));
    }
}
