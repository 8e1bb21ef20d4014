use anyhow::Result;
use console::{Term, style};
use serde::Serialize;

use crate::commands::module::QuizReport;
use crate::db::PostPage;
use crate::models::{Appointment, ChatKind, Comment, Module, Post, User, count_comments};

const WRAP_WIDTH: usize = 80;

pub struct Output {
    term: Term,
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            json,
        }
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        self.term.write_line(&output)?;
        Ok(())
    }

    // -- accounts & session --

    pub fn user_registered(&self, user: &User) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Registered account:").green(),
            style(&user.id).cyan().bold()
        ))?;
        self.term
            .write_line(&format!("  Name: {}", user.full_name))?;
        self.term
            .write_line(&format!("  Role: {}", style(user.role.as_ref()).yellow()))?;
        Ok(())
    }

    pub fn user_list(&self, users: &[User]) -> Result<()> {
        if self.json {
            return self.print_json(users);
        }

        if users.is_empty() {
            self.term.write_line("No accounts found.")?;
            return Ok(());
        }

        for user in users {
            self.term.write_line(&format!(
                "{} [{}] {} <{}>",
                style(&user.id).cyan().bold(),
                style(user.role.as_ref()).yellow(),
                user.full_name,
                user.email
            ))?;
        }
        Ok(())
    }

    pub fn signed_in(&self, user: &User) -> Result<()> {
        self.term.write_line(&format!(
            "{} {} [{}]",
            style("Signed in as").green(),
            style(&user.full_name).cyan().bold(),
            style(user.role.as_ref()).yellow()
        ))?;
        Ok(())
    }

    pub fn signed_out(&self) -> Result<()> {
        self.term
            .write_line(&style("Signed out.").green().to_string())?;
        Ok(())
    }

    pub fn whoami(&self, user: &User) -> Result<()> {
        if self.json {
            return self.print_json(user);
        }

        self.term.write_line(&format!(
            "{} [{}]",
            style(&user.full_name).cyan().bold(),
            style(user.role.as_ref()).yellow()
        ))?;
        self.term.write_line(&format!("  Id: {}", user.id))?;
        self.term.write_line(&format!("  Email: {}", user.email))?;
        Ok(())
    }

    // -- posts --

    pub fn post_created(&self, post: &Post) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Created post:").green(),
            style(&post.id).cyan().bold()
        ))?;
        self.term.write_line(&format!("  Title: {}", post.title))?;
        if !post.image_urls.is_empty() {
            self.term
                .write_line(&format!("  Images: {}", post.image_urls.join(", ")))?;
        }
        Ok(())
    }

    pub fn post_list(&self, page: &PostPage) -> Result<()> {
        if self.json {
            return self.print_json(page);
        }

        if page.posts.is_empty() {
            self.term.write_line("No posts found.")?;
            return Ok(());
        }

        for post in &page.posts {
            self.term.write_line(&format!(
                "{} {}",
                style(&post.id).cyan().bold(),
                style(&post.title).bold()
            ))?;
            self.term.write_line(&format!(
                "  {} | {} like(s), {} comment(s)",
                style(&post.created_at).dim(),
                post.likes.len(),
                count_comments(&post.comments)
            ))?;
            self.term.write_line("")?;
        }

        if page.has_more {
            if let Some(last) = page.posts.last() {
                self.term.write_line(&format!(
                    "More posts available: rerun with --after {}",
                    style(&last.id).cyan()
                ))?;
            }
        }
        Ok(())
    }

    pub fn post_shown(&self, post: &Post) -> Result<()> {
        if self.json {
            return self.print_json(post);
        }

        self.term.write_line(&format!(
            "{} {}",
            style(&post.id).cyan().bold(),
            style(&post.title).bold()
        ))?;
        self.term.write_line(&format!(
            "  By {} at {}",
            post.author_id,
            style(&post.created_at).dim()
        ))?;
        self.term
            .write_line(&format!("  {} like(s)", post.likes.len()))?;
        self.term.write_line("")?;
        self.term
            .write_line(&textwrap::indent(&textwrap::fill(&post.content, WRAP_WIDTH), "  "))?;

        for image in &post.image_urls {
            self.term.write_line(&format!("  [image] {image}"))?;
        }

        if !post.comments.is_empty() {
            self.term.write_line("")?;
            self.term.write_line(
                &style(format!("Comments ({}):", count_comments(&post.comments)))
                    .bold()
                    .to_string(),
            )?;
            self.print_comment_tree(&post.comments, 0)?;
        }
        Ok(())
    }

    fn print_comment_tree(&self, comments: &[Comment], depth: usize) -> Result<()> {
        let indent = "  ".repeat(depth + 1);
        for comment in comments {
            self.term.write_line(&format!(
                "{}{} {} {}",
                indent,
                style(&comment.id).cyan(),
                comment.author_id,
                style(&comment.created_at).dim()
            ))?;
            let body = textwrap::fill(&comment.content, WRAP_WIDTH.saturating_sub(indent.len()));
            self.term
                .write_line(&textwrap::indent(&body, &format!("{indent}  ")))?;
            self.print_comment_tree(&comment.children, depth + 1)?;
        }
        Ok(())
    }

    pub fn post_updated(&self, post: &Post) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Updated post:").green(),
            style(&post.id).cyan().bold()
        ))?;
        Ok(())
    }

    pub fn post_deleted(&self, post: &Post) -> Result<()> {
        self.term.write_line(&format!(
            "{} {} ({})",
            style("Deleted post:").red(),
            style(&post.id).cyan().bold(),
            post.title
        ))?;
        Ok(())
    }

    pub fn post_liked(&self, post: &Post, liked: bool) -> Result<()> {
        let verb = if liked { "Liked" } else { "Unliked" };
        self.term.write_line(&format!(
            "{} {} ({} like(s))",
            style(format!("{verb} post:")).green(),
            style(&post.id).cyan().bold(),
            post.likes.len()
        ))?;
        Ok(())
    }

    pub fn post_snapshot(&self, post: &Post, index: usize) -> Result<()> {
        self.term.write_line(
            &style(format!("--- snapshot {index} ---"))
                .dim()
                .to_string(),
        )?;
        self.post_shown(post)?;
        self.term.write_line("")?;
        Ok(())
    }

    pub fn watch_ended(&self) -> Result<()> {
        self.term
            .write_line(&style("Watch ended.").dim().to_string())?;
        Ok(())
    }

    // -- comments --

    pub fn comment_added(&self, post: &Post, comment: &Comment) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Added comment:").green(),
            style(&comment.id).cyan().bold()
        ))?;
        self.term.write_line(&format!(
            "  Total comments on {}: {}",
            post.id,
            count_comments(&post.comments)
        ))?;
        Ok(())
    }

    pub fn comment_updated(&self, post: &Post, comment_id: &str) -> Result<()> {
        self.term.write_line(&format!(
            "{} {} on post {}",
            style("Updated comment:").green(),
            style(comment_id).cyan().bold(),
            post.id
        ))?;
        Ok(())
    }

    pub fn comment_deleted(&self, post: &Post, comment_id: &str) -> Result<()> {
        self.term.write_line(&format!(
            "{} {} (and its replies) from post {}",
            style("Deleted comment:").red(),
            style(comment_id).cyan().bold(),
            post.id
        ))?;
        Ok(())
    }

    // -- modules --

    pub fn module_created(&self, module: &Module) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Created module:").green(),
            style(&module.id).cyan().bold()
        ))?;
        self.term
            .write_line(&format!("  Title: {}", module.title))?;
        self.term
            .write_line(&format!("  Quiz questions: {}", module.quiz.len()))?;
        Ok(())
    }

    pub fn module_list(&self, modules: &[Module]) -> Result<()> {
        if self.json {
            return self.print_json(modules);
        }

        if modules.is_empty() {
            self.term.write_line("No modules found.")?;
            return Ok(());
        }

        for module in modules {
            self.term.write_line(&format!(
                "{} {}",
                style(&module.id).cyan().bold(),
                style(&module.title).bold()
            ))?;
            self.term
                .write_line(&format!("  {}", module.description))?;
            self.term.write_line("")?;
        }
        Ok(())
    }

    pub fn module_shown(&self, module: &Module) -> Result<()> {
        if self.json {
            return self.print_json(module);
        }

        self.term.write_line(&format!(
            "{} {}",
            style(&module.id).cyan().bold(),
            style(&module.title).bold()
        ))?;
        self.term
            .write_line(&format!("  {}", module.description))?;
        self.term.write_line("")?;
        self.term
            .write_line(&textwrap::indent(&textwrap::fill(&module.content, WRAP_WIDTH), "  "))?;

        if !module.quiz.is_empty() {
            self.term.write_line("")?;
            self.term.write_line(&style("Quiz:").bold().to_string())?;
            for (index, question) in module.quiz.iter().enumerate() {
                self.term
                    .write_line(&format!("  {}. {}", index + 1, question.question))?;
                self.term
                    .write_line(&format!("     Options: {}", question.options.join(", ")))?;
            }
        }
        Ok(())
    }

    pub fn quiz_graded(&self, report: &QuizReport) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}/{} on {}",
            style("Score:").green().bold(),
            report.score.correct,
            report.score.total,
            report.module.title
        ))?;
        Ok(())
    }

    // -- appointments --

    pub fn appointment_booked(&self, appointment: &Appointment) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Booked appointment:").green(),
            style(&appointment.id).cyan().bold()
        ))?;
        self.term
            .write_line(&format!("  Expert: {}", appointment.expert_id))?;
        self.term
            .write_line(&format!("  Start: {}", appointment.start_time))?;
        Ok(())
    }

    pub fn appointment_list(&self, appointments: &[Appointment]) -> Result<()> {
        if self.json {
            return self.print_json(appointments);
        }

        if appointments.is_empty() {
            self.term.write_line("No appointments found.")?;
            return Ok(());
        }

        for appointment in appointments {
            self.term.write_line(&format!(
                "{} [{}]",
                style(&appointment.id).cyan().bold(),
                style(appointment.status.as_ref()).yellow()
            ))?;
            self.term.write_line(&format!(
                "  {} with expert {}",
                appointment.start_time, appointment.expert_id
            ))?;
            self.term
                .write_line(&format!("  Messages: {}", appointment.chats.len()))?;
            self.term.write_line("")?;
        }
        Ok(())
    }

    pub fn appointment_finished(&self, appointment: &Appointment) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Finished appointment:").green(),
            style(&appointment.id).cyan().bold()
        ))?;
        Ok(())
    }

    pub fn chat_sent(&self, appointment: &Appointment) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            style("Sent message in appointment:").green(),
            style(&appointment.id).cyan().bold()
        ))?;
        if let Some(message) = appointment.chats.last() {
            let label = match message.kind {
                ChatKind::Image => "[image] ",
                ChatKind::Text | ChatKind::System => "",
            };
            self.term
                .write_line(&format!("  {}: {label}{}", message.user_name, message.content))?;
        }
        Ok(())
    }
}
