//! Idempotent demonstration data loader.
//!
//! Loads the demo accounts, catalog, and sessions the portal ships with.
//! Safe to re-run: every record is keyed on its natural unique column and
//! existing rows are left untouched. Apply schema.sql before running.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use coursechoice::auth::hash_password;
use coursechoice::database::{DatabaseConfig, DatabaseManager};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seed_demo=info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let db = DatabaseManager::new(DatabaseConfig::default())
        .await
        .context("failed to create database pool")?;
    let pool = db.pool();

    info!("Seeding demonstration data");

    let admin_hash = hash_password("admin123").context("failed to hash admin password")?;
    ensure_admin(pool, "System Administrator", "admin@university.edu", &admin_hash).await?;
    ensure_admin(pool, "Academic Dean", "dean@university.edu", &admin_hash).await?;

    let professor = ensure_position(pool, "Professor", "Senior faculty position", 12).await?;
    let associate =
        ensure_position(pool, "Associate Professor", "Mid-level faculty position", 15).await?;
    let assistant =
        ensure_position(pool, "Assistant Professor", "Junior faculty position", 18).await?;
    let lecturer = ensure_position(pool, "Lecturer", "Teaching-focused position", 20).await?;

    let faculty_hash = hash_password("faculty123").context("failed to hash faculty password")?;
    let faculty = [
        ensure_faculty(pool, "Dr. John Smith", "john.smith@university.edu", &faculty_hash, professor).await?,
        ensure_faculty(pool, "Dr. Sarah Johnson", "sarah.johnson@university.edu", &faculty_hash, associate).await?,
        ensure_faculty(pool, "Dr. Michael Brown", "michael.brown@university.edu", &faculty_hash, assistant).await?,
        ensure_faculty(pool, "Prof. Emily Davis", "emily.davis@university.edu", &faculty_hash, lecturer).await?,
    ];

    let courses = [
        ensure_course(pool, "Introduction to Computer Science", "CS101", "Basic programming concepts and problem solving", 3, false).await?,
        ensure_course(pool, "Data Structures and Algorithms", "CS201", "Fundamental data structures and algorithmic thinking", 4, false).await?,
        ensure_course(pool, "Database Systems", "CS301", "Relational databases and SQL", 3, false).await?,
        ensure_course(pool, "Web Development", "CS302", "Modern web technologies and frameworks", 3, true).await?,
        ensure_course(pool, "Machine Learning", "CS401", "Introduction to ML algorithms and applications", 4, true).await?,
        ensure_course(pool, "Software Engineering", "CS303", "Software development lifecycle and best practices", 3, false).await?,
    ];

    let fall = ensure_session(
        pool,
        "Fall 2024 Course Assignment",
        "Faculty course preferences for Fall 2024 semester",
        true,
        4,
    )
    .await?;
    let spring = ensure_session(
        pool,
        "Spring 2025 Course Assignment",
        "Faculty course preferences for Spring 2025 semester",
        false,
        3,
    )
    .await?;

    for course_id in &courses {
        ensure_session_course(pool, fall, *course_id).await?;
    }
    for course_id in courses.iter().take(4) {
        ensure_session_course(pool, spring, *course_id).await?;
    }
    for faculty_id in &faculty {
        ensure_session_faculty(pool, fall, *faculty_id).await?;
    }

    info!("Seeding complete");
    info!("Admin logins: admin@university.edu / admin123, dean@university.edu / admin123");
    info!("Faculty logins: john.smith / sarah.johnson / michael.brown / emily.davis @university.edu, password faculty123");

    Ok(())
}

async fn ensure_admin(pool: &PgPool, name: &str, email: &str, password_hash: &str) -> Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "SELECT admin_id FROM coursechoice.admins WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO coursechoice.admins (admin_id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING admin_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to seed admin {email}"))?;

    info!("Created admin {email}");
    Ok(id)
}

async fn ensure_position(pool: &PgPool, name: &str, details: &str, min_credits: i32) -> Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "SELECT position_id FROM coursechoice.positions WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO coursechoice.positions (position_id, name, details, min_credits)
        VALUES ($1, $2, $3, $4)
        RETURNING position_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(details)
    .bind(min_credits)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to seed position {name}"))?;

    info!("Created position {name}");
    Ok(id)
}

async fn ensure_faculty(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    position_id: Uuid,
) -> Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "SELECT faculty_id FROM coursechoice.faculty WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO coursechoice.faculty (faculty_id, name, email, password_hash, position_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING faculty_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(position_id)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to seed faculty {email}"))?;

    info!("Created faculty {email}");
    Ok(id)
}

async fn ensure_course(
    pool: &PgPool,
    course_name: &str,
    course_code: &str,
    details: &str,
    credits: i32,
    is_elective: bool,
) -> Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "SELECT course_id FROM coursechoice.courses WHERE course_code = $1",
    )
    .bind(course_code)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO coursechoice.courses
            (course_id, course_name, course_code, details, credits, is_elective)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING course_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(course_name)
    .bind(course_code)
    .bind(details)
    .bind(credits)
    .bind(is_elective)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to seed course {course_code}"))?;

    info!("Created course {course_code}");
    Ok(id)
}

async fn ensure_session(
    pool: &PgPool,
    name: &str,
    details: &str,
    is_active: bool,
    max_courses: i32,
) -> Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "SELECT session_id FROM coursechoice.sessions WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO coursechoice.sessions (session_id, name, details, is_active, max_courses)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING session_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(details)
    .bind(is_active)
    .bind(max_courses)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to seed session {name}"))?;

    info!("Created session {name}");
    Ok(id)
}

async fn ensure_session_course(pool: &PgPool, session_id: Uuid, course_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coursechoice.session_courses (session_course_id, session_id, course_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, course_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(course_id)
    .execute(pool)
    .await
    .context("failed to link course to session")?;
    Ok(())
}

async fn ensure_session_faculty(pool: &PgPool, session_id: Uuid, faculty_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coursechoice.session_faculty (session_faculty_id, session_id, faculty_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, faculty_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(faculty_id)
    .execute(pool)
    .await
    .context("failed to assign faculty to session")?;
    Ok(())
}
