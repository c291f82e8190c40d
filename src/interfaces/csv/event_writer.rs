use crate::domain::event::TestamentEvent;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct EventRecord<'a> {
    event: &'a str,
    from: &'a str,
    to: Option<&'a str>,
    amount: Option<Decimal>,
}

impl<'a> From<&'a TestamentEvent> for EventRecord<'a> {
    fn from(event: &'a TestamentEvent) -> Self {
        let name = event.name();
        match event {
            TestamentEvent::Registered { address } => Self {
                event: name,
                from: address.as_str(),
                to: None,
                amount: None,
            },
            TestamentEvent::TestamentTriggered { from, to, amount } => Self {
                event: name,
                from: from.as_str(),
                to: Some(to.as_str()),
                amount: Some(amount.0.normalize()),
            },
            TestamentEvent::Unsubscribed { address, refunded } => Self {
                event: name,
                from: address.as_str(),
                to: Some(address.as_str()),
                amount: Some(refunded.0.normalize()),
            },
        }
    }
}

/// Writes events as CSV rows `event,from,to,amount`, in the order received.
pub struct EventWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> EventWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_event(&mut self, event: &TestamentEvent) -> Result<()> {
        self.writer.serialize(EventRecord::from(event))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
