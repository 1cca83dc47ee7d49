//! Plain-text mail bodies for booking notifications.

use super::{BookingCancellation, BookingConfirmation};

pub struct Mail {
    pub subject: String,
    pub body: String,
}

pub fn booking_confirmation(data: &BookingConfirmation) -> Mail {
    let subject = format!("You're in! Your ticket for {}", data.event_name);
    let body = format!(
        "You're In, {name}!\n\
         Your spot has been confirmed for the event below.\n\
         \n\
         {event}\n\
         Date:     {date}\n\
         Time:     {time}\n\
         Location: {location}\n\
         \n\
         Your Ticket Code: {code}\n\
         Present this code at the event check-in.\n",
        name = data.attendee_name,
        event = data.event_name,
        date = data.event_date,
        time = data.event_time,
        location = data.event_location,
        code = data.ticket_code,
    );
    Mail { subject, body }
}

pub fn booking_cancellation(data: &BookingCancellation) -> Mail {
    let subject = format!("Your booking for {} was cancelled", data.event_name);
    let body = format!(
        "Hi {name},\n\
         \n\
         Your booking for {event} has been cancelled and your spot has been\n\
         released. If this was a mistake you can book again at any time,\n\
         subject to availability.\n",
        name = data.attendee_name,
        event = data.event_name,
    );
    Mail { subject, body }
}
