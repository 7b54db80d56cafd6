use chrono::{Duration, Utc};

use mythmail_core::{Email, Folder};

struct Sample {
    id: &'static str,
    from: &'static str,
    subject: &'static str,
    preview: &'static str,
    body: Option<&'static str>,
    html_body: Option<&'static str>,
    age_days: i64,
    unread: bool,
    starred: bool,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "1",
        from: "Sarah Johnson <sarah.johnson@example.com>",
        subject: "Marketing Campaign Review",
        preview: "Hi, I hope this email finds you well. I'm writing to follow up on our meeting last week regarding the new marketing campaign.",
        body: Some(
            "Hi,\n\nI hope this email finds you well. I'm writing to follow up on our meeting last week regarding the new marketing campaign.\n\nI've attached the proposal document for your review. Please let me know if you have any questions.\n\nBest regards,\nSarah",
        ),
        html_body: None,
        age_days: 2,
        unread: true,
        starred: false,
    },
    Sample {
        id: "2",
        from: "Project Team <projects@example.com>",
        subject: "Project Kickoff Agenda",
        preview: "Dear Team, Please find attached the agenda for our upcoming project kickoff meeting scheduled for next Tuesday at 10 AM.",
        body: Some(
            "Dear Team,\n\nPlease find attached the agenda for our upcoming project kickoff meeting scheduled for next Tuesday at 10 AM.\n\nYour active participation is highly valued.\n\nThank you,\nProject Management",
        ),
        html_body: None,
        age_days: 3,
        unread: true,
        starred: true,
    },
    Sample {
        id: "3",
        from: "Tech Conference <events@techconf.example>",
        subject: "Annual Tech Conference Invitation",
        preview: "Dear Tech Enthusiast, We are excited to invite you to our Annual Tech Conference. Register now to secure your spot.",
        body: None,
        html_body: Some(
            "<h2>Annual Tech Conference</h2><p>Dear Tech Enthusiast,</p><p>We are excited to invite you. <a href=\"https://techconf.example/register\" target=\"_self\">Register now</a> to take advantage of early bird discounts.</p><img src=\"https://techconf.example/banner.png\" alt=\"banner\" onerror=\"alert(1)\"><script>track()</script>",
        ),
        age_days: 4,
        unread: false,
        starred: false,
    },
    Sample {
        id: "4",
        from: "Product Team <product@example.com>",
        subject: "New Product: Innovate X Launch",
        preview: "Hi Team, I'm pleased to announce that we have successfully launched our new product, the 'Innovate X'.",
        body: None,
        html_body: None,
        age_days: 5,
        unread: false,
        starred: false,
    },
    Sample {
        id: "5",
        from: "Marketing <offers@example.com>",
        subject: "Exclusive Discount for Premium Services",
        preview: "Dear Valued Customer, We are excited to offer you an exclusive 20% discount on our premium services. Use the code PREMIUM20 at checkout.",
        body: None,
        html_body: None,
        age_days: 6,
        unread: false,
        starred: false,
    },
];

/// Offline listing used when the backend cannot be reached.
pub fn mock_emails(folder: &str) -> Vec<Email> {
    let now = Utc::now();
    let emails = SAMPLES.iter().map(|s| Email {
        id: s.id.to_string(),
        from: s.from.to_string(),
        to: vec!["me@mythmail.local".to_string()],
        subject: s.subject.to_string(),
        preview: s.preview.to_string(),
        body: s.body.map(str::to_string),
        html_body: s.html_body.map(str::to_string),
        date: now - Duration::days(s.age_days),
        unread: s.unread,
        starred: s.starred,
        folder: "inbox".to_string(),
        has_attachments: false,
    });
    match Folder::by_id(folder) {
        Ok(folder) => emails.filter(|e| folder.contains(e)).collect(),
        Err(_) => emails.filter(|e| e.folder == folder).collect(),
    }
}
