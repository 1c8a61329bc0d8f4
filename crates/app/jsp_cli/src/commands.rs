use std::sync::Arc;

use jsp_core::models::{Course, Event, Quiz};
use jsp_core::{
    ClientConfig, CourseCollections, CourseTab, EnrollmentController, QuizRosterController,
    ScheduleController, SessionManager,
};

use crate::cli::{Cli, Commands};
use crate::{Error, Result};

pub async fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            println!("jsp_core {}", jsp_core::version());
            Ok(())
        }
        Commands::Login { email, password } => {
            let session = connect(cli)?;
            let logged_in = session.login(email, password).await?;
            println!("{}", logged_in.user.greeting());
            Ok(())
        }
        Commands::Logout => {
            connect(cli)?.logout();
            println!("Déconnecté");
            Ok(())
        }
        Commands::Whoami => {
            let session = logged_in(cli)?;
            let user = session.current_user().await?;
            println!("{} <{}>", user.display_name(), user.email);
            if let Some(grade) = &user.grade {
                println!("Grade: {grade}");
            }
            Ok(())
        }
        Commands::Courses { all } => {
            let courses = EnrollmentController::new(logged_in(cli)?);
            if *all {
                courses.set_tab(CourseTab::All);
            }
            let collections = courses.load_all().await?;
            print_courses(&collections, courses.tab());
            Ok(())
        }
        Commands::Subscribe { course_id } => {
            let courses = EnrollmentController::new(logged_in(cli)?);
            let collections = courses.subscribe(*course_id).await?;
            println!("Inscrit au cours {course_id}");
            print_courses(&collections, CourseTab::Mine);
            Ok(())
        }
        Commands::Unsubscribe { course_id } => {
            let courses = EnrollmentController::new(logged_in(cli)?);
            let collections = courses.unsubscribe(*course_id).await?;
            println!("Désinscrit du cours {course_id}");
            print_courses(&collections, CourseTab::Mine);
            Ok(())
        }
        Commands::Events => {
            let schedule = ScheduleController::new(logged_in(cli)?);
            let events = schedule.load().await?;
            if events.is_empty() {
                println!("Aucun événement");
            }
            events.iter().for_each(print_event);
            Ok(())
        }
        Commands::Quizzes => {
            let roster = QuizRosterController::new(logged_in(cli)?);
            let quizzes = roster.load_roster().await?;
            if quizzes.is_empty() {
                println!("Aucun quiz disponible");
            }
            quizzes.iter().for_each(print_quiz);
            Ok(())
        }
    }
}

/// Environment config with the command-line overrides applied.
fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        let endpoints = config.endpoints;
        config = ClientConfig::new(url)?;
        config.endpoints = endpoints;
    }
    if let Some(path) = &cli.token_file {
        config.token_path = path.clone();
    }
    log::debug!("token file: {}", config.token_path.display());
    Ok(config)
}

fn connect(cli: &Cli) -> Result<Arc<SessionManager>> {
    Ok(Arc::new(SessionManager::from_config(&client_config(cli)?)))
}

/// Commands that read learner data need a stored token.
fn logged_in(cli: &Cli) -> Result<Arc<SessionManager>> {
    let session = connect(cli)?;
    if !session.is_authenticated() {
        return Err(Error::NotLoggedIn);
    }
    Ok(session)
}

fn print_courses(collections: &CourseCollections, tab: CourseTab) {
    println!(
        "Mes cours ({}) | Tous les cours ({})",
        collections.count(CourseTab::Mine),
        collections.count(CourseTab::All)
    );
    let courses = collections.courses(tab);
    if courses.is_empty() {
        println!("Aucun cours");
    }
    for course in courses {
        print_course(course, collections.is_enrolled(course));
    }
}

fn print_course(course: &Course, enrolled: bool) {
    let mark = if enrolled { "*" } else { " " };
    println!("{mark} {:>5}  {}", course.id, course.titre);
    if let Some(label) = &course.type_label {
        println!("         Type: {label}");
    }
    if let Some(formateur) = &course.formateur {
        println!("         Formateur: {formateur}");
    }
    if let Some(description) = &course.description {
        println!("         {description}");
    }
    if course.fichier.is_some() {
        println!("         Support: {}", course.download_file_name());
    }
}

fn print_event(event: &Event) {
    let when = match (&event.start, &event.end) {
        (Some(start), Some(end)) => format!("{start} -> {end}"),
        (Some(start), None) => start.clone(),
        _ => "date inconnue".to_string(),
    };
    let all_day = if event.all_day { " (journée)" } else { "" };
    println!("{when}{all_day}  {}", event.title);
    for line in event.details().lines() {
        println!("    {line}");
    }
}

fn print_quiz(quiz: &Quiz) {
    match quiz.question_count_label() {
        Some(count) => println!("{:>5}  {} ({count})", quiz.id, quiz.title),
        None => println!("{:>5}  {}", quiz.id, quiz.title),
    }
    if let Some(description) = &quiz.description {
        println!("       {description}");
    }
}
