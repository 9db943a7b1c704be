//! In-memory article and comment storage backing the demo site.
//!
//! Intentionally not persistent: the store exists to give the pages
//! and the JSON endpoints something to serve.

use std::sync::Mutex;

use chrono::NaiveDate;
use kstring::KString;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Article {
    pub id: u32,
    pub title: KString,
    pub author: KString,
    pub content: KString,
    pub publish_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub article_id: u32,
    pub author: KString,
    pub email: KString,
    pub body: KString,
}

pub struct Store {
    articles: Mutex<Vec<Article>>,
    comments: Mutex<Vec<Comment>>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

impl Store {
    pub fn empty() -> Store {
        Store {
            articles: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
        }
    }

    /// A store with a handful of articles and comments to browse.
    pub fn seeded() -> Store {
        let store = Store::empty();
        {
            let mut articles = store.articles.lock().expect("store lock never poisoned");
            articles.push(Article {
                id: 1,
                title: KString::from_static("Template literals on the server"),
                author: KString::from_static("mira"),
                content: KString::from_static(
                    "Pages are easiest to reason about as plain markup with \
                     holes in it. Keep the holes open until the last moment \
                     and most of a framework becomes unnecessary.",
                ),
                publish_date: date(2024, 11, 2),
            });
            articles.push(Article {
                id: 2,
                title: KString::from_static("Streaming HTML without buffering"),
                author: KString::from_static("jonas"),
                content: KString::from_static(
                    "A page is a tree of fragments, and a tree can be walked \
                     lazily. Sending the first chunk before the last one is \
                     computed makes slow pages feel fast.",
                ),
                publish_date: date(2025, 1, 17),
            });
            articles.push(Article {
                id: 3,
                title: KString::from_static("Widgets that update themselves"),
                author: KString::from_static("mira"),
                content: KString::from_static(
                    "Ship the refresh logic together with the element it \
                     refreshes. The server decides what to poll and how to \
                     render it; the browser only runs the result.",
                ),
                publish_date: date(2025, 3, 5),
            });
        }
        {
            let mut comments = store.comments.lock().expect("store lock never poisoned");
            comments.push(Comment {
                article_id: 1,
                author: KString::from_static("odo"),
                email: KString::from_static("odo@example.net"),
                body: KString::from_static("Finally an argument for fewer moving parts."),
            });
            comments.push(Comment {
                article_id: 2,
                author: KString::from_static("petra"),
                email: KString::from_static("petra@example.net"),
                body: KString::from_static(
                    "Tried this on a report page with 40k rows, works nicely.",
                ),
            });
            comments.push(Comment {
                article_id: 3,
                author: KString::from_static("sam"),
                email: KString::from_static("sam@example.net"),
                body: KString::from_static("How do clones avoid id collisions?"),
            });
        }
        store
    }

    pub fn articles(&self) -> Vec<Article> {
        self.articles.lock().expect("store lock never poisoned").clone()
    }

    pub fn article(&self, id: u32) -> Option<Article> {
        self.articles
            .lock()
            .expect("store lock never poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.lock().expect("store lock never poisoned").clone()
    }

    pub fn comments_for(&self, article_id: u32) -> Vec<Comment> {
        self.comments
            .lock()
            .expect("store lock never poisoned")
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect()
    }

    pub fn add_comment(&self, comment: Comment) {
        self.comments
            .lock()
            .expect("store lock never poisoned")
            .push(comment);
    }

    pub fn random_comment(&self) -> Option<Comment> {
        let comments = self.comments.lock().expect("store lock never poisoned");
        if comments.is_empty() {
            return None;
        }
        let i = rand::thread_rng().gen_range(0..comments.len());
        Some(comments[i].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_seeded_lookup() {
        let store = Store::seeded();
        assert_eq!(store.articles().len(), 3);
        assert_eq!(store.article(2).unwrap().author.as_str(), "jonas");
        assert!(store.article(99).is_none());
        assert_eq!(store.comments_for(1).len(), 1);
        assert!(store.random_comment().is_some());
    }

    #[test]
    fn t_add_comment() {
        let store = Store::seeded();
        let before = store.comments_for(1).len();
        store.add_comment(Comment {
            article_id: 1,
            author: KString::from_static("nia"),
            email: KString::from_static("nia@example.net"),
            body: KString::from_static("Seconded."),
        });
        assert_eq!(store.comments_for(1).len(), before + 1);
    }

    #[test]
    fn t_empty_store() {
        let store = Store::empty();
        assert!(store.random_comment().is_none());
        assert!(store.comments().is_empty());
    }

    #[test]
    fn t_comment_serializes() {
        let json = serde_json::to_string(&Comment {
            article_id: 7,
            author: KString::from_static("odo"),
            email: KString::from_static("odo@example.net"),
            body: KString::from_static("hi"),
        })
        .unwrap();
        assert!(json.contains("\"article_id\":7"));
        assert!(json.contains("\"author\":\"odo\""));
    }
}
