// src/notify/digest.rs
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

use crate::post::Post;

pub const UNKNOWN_DATE: &str = "Unknown Date";
const NO_CONTENT: &str = "No content available";

/// One message: subject plus plain and HTML renderings of the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

fn date_label(post: &Post) -> String {
    post.date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn content_label(post: &Post) -> &str {
    if post.content.is_empty() {
        NO_CONTENT
    } else {
        &post.content
    }
}

pub fn compose_digest(posts: &[Post], site_url: &str) -> Digest {
    let subject = match posts {
        [only] => format!("New Erasmus Post: {}", only.title),
        _ => format!("New Erasmus Posts: {} new posts found", posts.len()),
    };

    Digest {
        subject,
        text_body: text_body(posts, site_url),
        html_body: html_body(posts, site_url),
    }
}

fn text_body(posts: &[Post], site_url: &str) -> String {
    let mut out = String::from("New Erasmus Posts Detected!\n\n");
    let _ = writeln!(
        out,
        "Found {} new post(s) on the Erasmus TUKE website.\n",
        posts.len()
    );
    for (i, post) in posts.iter().enumerate() {
        let _ = writeln!(out, "Post #{}:", i + 1);
        let _ = writeln!(out, "Title: {}", post.title);
        let _ = writeln!(out, "Date: {}", date_label(post));
        let _ = writeln!(out, "Content: {}", content_label(post));
        let _ = writeln!(out, "URL: {}\n", post.url.as_deref().unwrap_or("#"));
    }
    let _ = writeln!(out, "Website: {site_url}");
    out
}

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.header { background-color: #f0f8ff; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
.post { border: 1px solid #ddd; padding: 15px; margin-bottom: 15px; border-radius: 5px; }
.post-title { color: #1e90ff; font-size: 18px; font-weight: bold; margin-bottom: 10px; }
.post-date { color: #666; font-size: 14px; margin-bottom: 10px; }
.post-content { margin-bottom: 10px; }
.post-url a { color: #1e90ff; text-decoration: none; }
.footer { margin-top: 30px; padding: 15px; background-color: #f9f9f9; border-radius: 5px; font-size: 12px; color: #666; }";

fn html_body(posts: &[Post], site_url: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n\
         <div class=\"header\">\n<h2>New Erasmus Posts Detected!</h2>\n\
         <p>Found {} new post(s) on the Erasmus TUKE website.</p>\n</div>\n",
        posts.len()
    );

    for post in posts {
        let href = post.url.as_deref().unwrap_or("#");
        let _ = write!(
            out,
            "<div class=\"post\">\n\
             <div class=\"post-title\">{}</div>\n\
             <div class=\"post-date\">Date: {}</div>\n\
             <div class=\"post-content\">{}</div>\n\
             <div class=\"post-url\"><a href=\"{}\" target=\"_blank\">View Full Post</a></div>\n\
             </div>\n",
            encode_text(&post.title),
            encode_text(&date_label(post)),
            encode_text(content_label(post)),
            encode_double_quoted_attribute(href),
        );
    }

    let _ = write!(
        out,
        "<div class=\"footer\">\n<p>This email was sent by the Erasmus Tracker system.</p>\n\
         <p>Website: <a href=\"{}\">{}</a></p>\n</div>\n</body>\n</html>\n",
        encode_double_quoted_attribute(site_url),
        encode_text(site_url),
    );
    out
}

/// Fixed message for `--test-email`.
pub fn test_digest() -> Digest {
    let text_body = "Test Email\n\n\
        This is a test email from your Erasmus Tracker system.\n\
        If you receive this email, your email configuration is working correctly!\n\
        The system is now ready to notify you about new Erasmus posts.\n"
        .to_string();
    let html_body = "<html>\n<body>\n<h2>Test Email</h2>\n\
        <p>This is a test email from your Erasmus Tracker system.</p>\n\
        <p>If you receive this email, your email configuration is working correctly!</p>\n\
        <p>The system is now ready to notify you about new Erasmus posts.</p>\n\
        </body>\n</html>\n"
        .to_string();
    Digest {
        subject: "Erasmus Tracker - Test Email".to_string(),
        text_body,
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn post(title: &str, date: Option<NaiveDate>) -> Post {
        Post {
            title: title.into(),
            url: Some("https://erasmus.tuke.sk/vyzva".into()),
            date,
            content: "Prihlášky do 30.6.".into(),
            scraped_at: Utc::now(),
        }
    }

    const SITE: &str = "https://erasmus.tuke.sk/vyzvy-na-studentsku-mobilitu/";

    #[test]
    fn single_post_subject_names_title() {
        let d = compose_digest(&[post("Výzva 2025", None)], SITE);
        assert_eq!(d.subject, "New Erasmus Post: Výzva 2025");
    }

    #[test]
    fn multiple_posts_subject_counts() {
        let d = compose_digest(&[post("A", None), post("B", None)], SITE);
        assert_eq!(d.subject, "New Erasmus Posts: 2 new posts found");
        assert!(d.text_body.contains("Post #2:"));
    }

    #[test]
    fn bodies_list_date_or_placeholder_and_site() {
        let d = compose_digest(
            &[post("A", NaiveDate::from_ymd_opt(2024, 6, 1)), post("B", None)],
            SITE,
        );
        assert!(d.text_body.contains("Date: 2024-06-01"));
        assert!(d.text_body.contains("Date: Unknown Date"));
        assert!(d.text_body.contains("URL: https://erasmus.tuke.sk/vyzva"));
        assert!(d.text_body.ends_with(&format!("Website: {SITE}\n")));
        assert!(d.html_body.contains("Date: Unknown Date"));
        assert!(d.html_body.contains(SITE));
    }

    #[test]
    fn html_body_escapes_markup() {
        let d = compose_digest(&[post("<script>alert(1)</script> & co", None)], SITE);
        assert!(!d.html_body.contains("<script>alert"));
        assert!(d.html_body.contains("&lt;script&gt;"));
        assert!(d.html_body.contains("&amp; co"));
        // plain body stays verbatim
        assert!(d.text_body.contains("<script>alert(1)</script> & co"));
    }

    #[test]
    fn missing_url_links_to_hash() {
        let mut p = post("A", None);
        p.url = None;
        let d = compose_digest(&[p], SITE);
        assert!(d.text_body.contains("URL: #"));
        assert!(d.html_body.contains("href=\"#\""));
    }
}
