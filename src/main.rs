//! Command-line harness for the conflict detection engine.
//!
//! Interactive menu for entering appointments and ad-hoc calendar entries,
//! running detection, browsing the conflict panel, and jumping to events.
//! Stands in for the calendar UI that normally hosts the engine.

use chrono::NaiveDateTime;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use doublebook::{
    normalize_events, AppointmentRecord, CalendarNavigator, ConflictPanel, CustomEventRecord,
    Severity,
};

/// Console stand-in for the host calendar view.
#[derive(Default)]
struct ConsoleCalendar {
    displayed: Option<NaiveDateTime>,
}

impl CalendarNavigator for ConsoleCalendar {
    fn show_date(&mut self, target: NaiveDateTime) {
        self.displayed = Some(target);
        println!(
            "\nCalendar moved to {}",
            target.format("%A, %Y-%m-%d at %H:%M")
        );
    }
}

struct ConflictCli {
    appointments: Vec<AppointmentRecord>,
    custom_events: Vec<CustomEventRecord>,
    calendar: ConsoleCalendar,
    running: bool,
}

impl ConflictCli {
    fn new() -> Self {
        ConflictCli {
            appointments: Vec::new(),
            custom_events: Vec::new(),
            calendar: ConsoleCalendar::default(),
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       APPOINTMENT CONFLICT DETECTION");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Add appointment");
        println!("2. Add custom calendar entry");
        println!("3. View events");
        println!("4. View conflict panel");
        println!("5. Jump to event");
        println!("6. Export conflicts as JSON");
        println!("7. Run demo");
        println!("8. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> String {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i64>) -> i64 {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref());

            if let Ok(value) = input.parse::<i64>() {
                return value;
            }
            println!("Please enter a valid number");
        }
    }

    /// Fresh detection pass over the current record lists.
    fn build_panel(&self) -> ConflictPanel {
        ConflictPanel::new(normalize_events(&self.appointments, &self.custom_events))
    }

    fn add_appointment(&mut self) {
        println!("\n--- Add Appointment ---");

        let patient = self.get_input("Patient id", Some("P001"));
        let doctor = self.get_input("Doctor id (empty = unassigned)", None);
        let date = self.get_input("Date (YYYY-MM-DD)", Some("2025-08-15"));
        let time = self.get_input("Time (HH:MM)", Some("09:00"));
        let duration = self.get_int_input("Duration (minutes)", Some(30));
        let reason = self.get_input("Reason", None);

        let id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        let record = match AppointmentRecord::new(id, patient, date, time) {
            Ok(record) => record,
            Err(e) => {
                println!("Error creating appointment: {}", e);
                return;
            }
        };
        let record = if doctor.is_empty() {
            record
        } else {
            record.with_doctor(doctor)
        };
        let record = if reason.is_empty() {
            record
        } else {
            record.with_reason(reason)
        };
        let record = match record.with_duration(duration) {
            Ok(record) => record,
            Err(e) => {
                println!("Error creating appointment: {}", e);
                return;
            }
        };

        println!(
            "\nAppointment {} added ({} {})",
            record.id, record.date, record.time
        );
        self.appointments.push(record);
    }

    fn add_custom_event(&mut self) {
        println!("\n--- Add Custom Calendar Entry ---");

        let title = self.get_input("Title", Some("Staff meeting"));
        let start = self.get_input("Start (YYYY-MM-DDTHH:MM)", Some("2025-08-15T12:00"));
        let end = self.get_input("End (empty = 30 minutes)", None);

        let id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        let record = match CustomEventRecord::new(id, title, start) {
            Ok(record) => record,
            Err(e) => {
                println!("Error creating entry: {}", e);
                return;
            }
        };
        let record = if end.is_empty() {
            record
        } else {
            record.with_end(end)
        };

        println!("\nEntry {} added", record.id);
        self.custom_events.push(record);
    }

    fn view_events(&self) {
        let panel = self.build_panel();
        let events = panel.events();

        if events.is_empty() {
            println!("\nNo events yet");
            return;
        }

        println!("\n--- Events ({}) ---", events.len());
        if let Some(displayed) = self.calendar.displayed {
            println!("Calendar showing: {}", displayed.format("%Y-%m-%d %H:%M"));
        }
        for event in events {
            match event.window {
                Some(window) => println!(
                    "  [{}] {} | {} | {}",
                    event.id,
                    window.label(),
                    event.resource_id,
                    event.title
                ),
                None => println!("  [{}] <unparsable time> | {}", event.id, event.title),
            }
        }
    }

    fn view_conflicts(&self) {
        let panel = self.build_panel();

        if !panel.has_conflicts() {
            println!("\nNo conflicts detected");
            return;
        }

        println!(
            "\n--- Conflicts: {} group(s), {} event(s) involved ---",
            panel.groups().len(),
            panel.conflicting_event_count()
        );
        println!(
            "Badges: {} HIGH / {} MEDIUM",
            panel.count_with_severity(Severity::High),
            panel.count_with_severity(Severity::Medium)
        );

        for group in panel.groups_by_severity() {
            println!("\n[{:6}] {}", group.severity.name(), group.time_slot);
            for event in &group.conflicting_events {
                println!("    {} ({}) - {}", event.id, event.resource_id, event.title);
            }
        }
    }

    fn jump_to_event(&mut self) {
        let panel = self.build_panel();
        if panel.events().is_empty() {
            println!("\nNo events yet");
            return;
        }

        let id = self.get_input("Event id", None);
        match panel.select_event(&id, &mut self.calendar) {
            Ok(()) => {}
            Err(e) => println!("Cannot navigate: {}", e),
        }
    }

    fn export_conflicts(&self) {
        let panel = self.build_panel();
        match serde_json::to_string_pretty(panel.groups()) {
            Ok(json) => println!("\n{}", json),
            Err(e) => println!("Export failed: {}", e),
        }
    }

    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        self.appointments.clear();
        self.custom_events.clear();

        let records = [
            ("A", "P001", Some("D1"), "09:00", 30, "Annual checkup"),
            ("B", "P002", Some("D1"), "09:15", 30, "Follow-up"),
            ("C", "P003", Some("D2"), "09:00", 30, "Vaccination"),
            ("D", "P004", Some("D1"), "09:30", 30, "Consultation"),
            ("E", "P005", None, "09:20", 30, "Walk-in, no doctor yet"),
        ];

        for (id, patient, doctor, time, duration, reason) in records {
            let record = AppointmentRecord::new(id, patient, "2025-08-15", time)
                .unwrap()
                .with_duration(duration)
                .unwrap()
                .with_reason(reason);
            let record = match doctor {
                Some(doctor) => record.with_doctor(doctor),
                None => record,
            };
            self.appointments.push(record);
        }

        self.custom_events.push(
            CustomEventRecord::new("lunch", "Team lunch", "2025-08-15T12:00")
                .unwrap()
                .with_end("2025-08-15T13:00"),
        );

        println!("Loaded {} appointments for 2025-08-15:", self.appointments.len());
        println!("  - A: Dr. D1 at 09:00 (30 min)");
        println!("  - B: Dr. D1 at 09:15 (30 min) <- overlaps A");
        println!("  - C: Dr. D2 at 09:00 (30 min) <- other doctor, no conflict");
        println!("  - D: Dr. D1 at 09:30 (30 min) <- touches A, overlaps B");
        println!("  - E: unassigned at 09:20     <- collides with anything it overlaps");

        self.view_conflicts();

        println!("\nNote: B and E both overlap A and collide on its doctor (E has none");
        println!("yet), so one HIGH group claims A, B and E. C overlaps A but belongs");
        println!("to another doctor. D only touches A, and its overlap with B is not");
        println!("re-reported once B is already part of the first group.");
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(7));

            match choice {
                1 => self.add_appointment(),
                2 => self.add_custom_event(),
                3 => self.view_events(),
                4 => self.view_conflicts(),
                5 => self.jump_to_event(),
                6 => self.export_conflicts(),
                7 => self.run_demo(),
                8 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cli = ConflictCli::new();
    cli.run();
}
