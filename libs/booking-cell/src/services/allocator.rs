//! The booking allocator: schedule validation, capacity admission and queue
//! numbering, all inside one store transaction.

use std::sync::Arc;

use tracing::{debug, info};

use doctor_cell::schedule::{weekday_name, WeeklySchedule};

use crate::error::BookingError;
use crate::models::{
    BookingConfirmation, BookingWindow, CreateAppointmentRequest, DayTimeslots, QueuePriority,
    QueueStatus, RegistrationStatus, TimeSlot,
};
use crate::store::{BookingStore, NewNotification, NewQueueEntry, NewRegistration};

pub const SERVICE_TYPE_GENERAL: &str = "general_consultation";

pub struct BookingService {
    store: Arc<dyn BookingStore>,
    slot_capacity: i64,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, slot_capacity: i64) -> Self {
        Self {
            store,
            slot_capacity,
        }
    }

    /// Books an appointment and assigns the next queue number for the date.
    ///
    /// Every read that admission depends on and every write happen inside
    /// one transaction, so a failure after the registration insert leaves
    /// no partial rows behind and the numbering invariant holds under
    /// concurrent submission.
    pub async fn create_appointment(
        &self,
        patient_nik: &str,
        request: &CreateAppointmentRequest,
    ) -> Result<BookingConfirmation, BookingError> {
        debug!(
            doctor_id = request.doctor_id,
            date = %request.appointment_date,
            time = %request.appointment_time,
            "Booking appointment"
        );

        let mut unit = self.store.begin().await?;

        let patient_name = unit
            .patient_name(patient_nik)
            .await?
            .ok_or_else(|| BookingError::NotFound("Patient record not found".to_string()))?;

        if unit
            .has_live_registration(patient_nik, request.doctor_id, request.appointment_date)
            .await?
        {
            return Err(BookingError::Duplicate);
        }

        let doctor = unit
            .doctor_schedule(request.doctor_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Doctor not found".to_string()))?;

        let day = weekday_name(request.appointment_date);
        let schedule = WeeklySchedule::parse(doctor.practice_schedule.as_deref());
        let hours = schedule.hours_for(request.appointment_date).ok_or_else(|| {
            BookingError::ScheduleViolation(format!("Doctor does not practice on {}", day))
        })?;

        if !hours.contains(request.appointment_time) {
            return Err(BookingError::ScheduleViolation(format!(
                "Doctor practices on {} between {}",
                day,
                hours.display()
            )));
        }

        let window = BookingWindow::containing(request.appointment_time);
        let current = unit
            .count_window_bookings(request.doctor_id, request.appointment_date, &window)
            .await?;
        if current >= self.slot_capacity {
            return Err(BookingError::CapacityExceeded {
                current,
                max: self.slot_capacity,
            });
        }

        let registration_id = unit
            .insert_registration(&NewRegistration {
                patient_nik: patient_nik.to_string(),
                patient_name: patient_name.clone(),
                doctor_id: request.doctor_id,
                registration_date: request.appointment_date,
                registration_time: request.appointment_time,
                complaint: request.complaint.clone(),
                service_type: SERVICE_TYPE_GENERAL.to_string(),
                status: RegistrationStatus::Confirmed,
            })
            .await?;

        let queue_number = unit.next_queue_number(request.appointment_date).await?;

        let queue_entry_id = unit
            .insert_queue_entry(&NewQueueEntry {
                queue_number,
                registration_id,
                patient_nik: patient_nik.to_string(),
                patient_name,
                doctor_id: request.doctor_id,
                queue_date: request.appointment_date,
                status: QueueStatus::Waiting,
                priority: QueuePriority::Normal,
            })
            .await?;

        unit.insert_notification(&NewNotification {
            queue_entry_id,
            patient_nik: patient_nik.to_string(),
            title: "Registration confirmed".to_string(),
            body: format!(
                "Your appointment with Dr. {} on {} at {} is confirmed. Your queue number is {}.",
                doctor.full_name,
                request.appointment_date,
                request.appointment_time.format("%H:%M"),
                queue_number
            ),
            kind: "booking_confirmation".to_string(),
            queue_status_at_send: QueueStatus::Waiting,
        })
        .await?;

        unit.commit().await?;

        info!(
            registration_id,
            queue_number,
            doctor_id = request.doctor_id,
            date = %request.appointment_date,
            "Appointment booked"
        );

        Ok(BookingConfirmation {
            message: "Appointment booked successfully".to_string(),
            appointment_id: registration_id,
            queue_number,
            available_slots: self.slot_capacity - current - 1,
        })
    }

    /// Per-hour availability for one doctor on one date. Uses the same
    /// window predicate as `create_appointment`, so a slot reported open
    /// here is a slot the allocator would admit.
    pub async fn available_timeslots(
        &self,
        doctor_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<DayTimeslots, BookingError> {
        let doctor = self
            .store
            .doctor_schedule(doctor_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Doctor not found".to_string()))?;

        let day = weekday_name(date);
        let schedule = WeeklySchedule::parse(doctor.practice_schedule.as_deref());
        let Some(hours) = schedule.hours_for(date) else {
            return Ok(DayTimeslots {
                slots: Vec::new(),
                schedule_time: None,
                day: day.to_string(),
                message: Some(format!("Doctor does not practice on {}", day)),
            });
        };

        let mut slots = Vec::new();
        for hour in hours.open_hour()..hours.close_hour() {
            let window = BookingWindow::at_hour(hour);
            let current = self
                .store
                .window_booking_count(doctor_id, date, &window)
                .await?;
            slots.push(TimeSlot {
                time: window.start_label(),
                display_time: window.display(),
                max_capacity: self.slot_capacity,
                current_bookings: current,
                available_slots: (self.slot_capacity - current).max(0),
                is_full: current >= self.slot_capacity,
            });
        }

        Ok(DayTimeslots {
            slots,
            schedule_time: Some(hours.display()),
            day: day.to_string(),
            message: None,
        })
    }
}
