mod rows;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use hostelhub_shared::clients::db::DbPool;
use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};
use hostelhub_shared::types::auth::{AdminSubRole, Role};

use crate::models::{
    sort_committee, ActionChanges, ActionEntry, CommitteeMember, DisciplinaryAction, NewAccount,
    NewDisciplinaryAction, StaffProfile, StaffProfileFields, StudentAdminCard, StudentDetails, StudentListItem,
    StudentListProfile, StudentProfile, StudentProfileFields, User, UserCredentials,
    UserWithProfiles,
};
use crate::schema::{disciplinary_actions, staff_profiles, student_profiles, users};

use self::rows::*;
use super::{like_pattern, HostelStore};

type PooledConn = diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>;

/// Postgres-backed store over an r2d2 pool.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PooledConn> {
        self.pool.get().map_err(|e| AppError::internal(e.to_string()))
    }
}

fn email_taken(err: AppError) -> AppError {
    err.on_unique_violation(ErrorCode::EmailAlreadyExists, "email already registered")
}

fn insert_user(conn: &mut PgConnection, account: &NewAccount) -> AppResult<User> {
    let row: UserRow = diesel::insert_into(users::table)
        .values(&NewUserRow {
            first_name: &account.first_name,
            last_name: &account.last_name,
            email: &account.email,
            password_hash: &account.password_hash,
            role: account.role.as_str(),
        })
        .returning(UserRow::as_returning())
        .get_result(conn)
        .map_err(|e| email_taken(e.into()))?;
    row.try_into()
}

fn load_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<User>> {
    users::table
        .find(user_id)
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .optional()?
        .map(User::try_from)
        .transpose()
}

fn load_staff_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<StaffProfile>> {
    Ok(staff_profiles::table
        .filter(staff_profiles::user_id.eq(user_id))
        .select(StaffProfileRow::as_select())
        .first::<StaffProfileRow>(conn)
        .optional()?
        .map(StaffProfile::from))
}

fn load_student_profile(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<StudentProfile>> {
    student_profiles::table
        .filter(student_profiles::user_id.eq(user_id))
        .select(StudentProfileRow::as_select())
        .first::<StudentProfileRow>(conn)
        .optional()?
        .map(StudentProfile::try_from)
        .transpose()
}

fn load_actions(conn: &mut PgConnection, student_profile_id: Uuid) -> AppResult<Vec<ActionEntry>> {
    disciplinary_actions::table
        .inner_join(users::table)
        .filter(disciplinary_actions::student_profile_id.eq(student_profile_id))
        .order(disciplinary_actions::date_issued.desc())
        .select((ActionRow::as_select(), IssuerRow::as_select()))
        .load::<(ActionRow, IssuerRow)>(conn)?
        .into_iter()
        .map(|(action, issuer)| {
            Ok(ActionEntry { action: action.try_into()?, issued_by: issuer.into() })
        })
        .collect()
}

fn student_profile_exists(conn: &mut PgConnection, student_profile_id: Uuid) -> AppResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        student_profiles::table.filter(student_profiles::id.eq(student_profile_id)),
    ))
    .get_result(conn)?)
}

impl HostelStore for PgStore {
    fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn find_credentials(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let mut conn = self.conn()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?
            .map(UserRow::into_credentials)
            .transpose()
    }

    fn user_with_profiles(&self, user_id: Uuid) -> AppResult<UserWithProfiles> {
        let mut conn = self.conn()?;
        let user = load_user(&mut conn, user_id)?
            .ok_or_else(|| AppError::not_found("user not found"))?;
        Ok(UserWithProfiles {
            staff_profile: load_staff_profile(&mut conn, user_id)?,
            student_profile: load_student_profile(&mut conn, user_id)?,
            user,
        })
    }

    fn create_user(&self, account: NewAccount) -> AppResult<User> {
        let mut conn = self.conn()?;
        insert_user(&mut conn, &account)
    }

    fn register_staff(&self, account: NewAccount, fields: StaffProfileFields) -> AppResult<UserWithProfiles> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let user = insert_user(conn, &account)?;
            let profile: StaffProfileRow = diesel::insert_into(staff_profiles::table)
                .values(&NewStaffProfileRow::new(user.id, &fields, None))
                .returning(StaffProfileRow::as_returning())
                .get_result(conn)?;
            Ok(UserWithProfiles { user, staff_profile: Some(profile.into()), student_profile: None })
        })
    }

    fn register_student(&self, account: NewAccount, fields: StudentProfileFields) -> AppResult<UserWithProfiles> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let user = insert_user(conn, &account)?;
            let profile: StudentProfileRow = diesel::insert_into(student_profiles::table)
                .values(&NewStudentProfileRow::new(user.id, &fields, None))
                .returning(StudentProfileRow::as_returning())
                .get_result(conn)?;
            Ok(UserWithProfiles { user, staff_profile: None, student_profile: Some(profile.try_into()?) })
        })
    }

    fn set_user_active(&self, user_id: Uuid, is_active: bool) -> AppResult<User> {
        let mut conn = self.conn()?;
        diesel::update(users::table.find(user_id))
            .set((users::is_active.eq(is_active), users::updated_at.eq(Utc::now())))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::not_found("user not found"))?
            .try_into()
    }

    fn staff_profile(&self, user_id: Uuid) -> AppResult<Option<StaffProfile>> {
        let mut conn = self.conn()?;
        load_staff_profile(&mut conn, user_id)
    }

    fn upsert_staff_profile(
        &self,
        user_id: Uuid,
        fields: StaffProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StaffProfile> {
        let mut conn = self.conn()?;
        let row: StaffProfileRow = diesel::insert_into(staff_profiles::table)
            .values(&NewStaffProfileRow::new(user_id, &fields, photo_url.as_deref()))
            .on_conflict(staff_profiles::user_id)
            .do_update()
            .set(&StaffProfileChanges::new(&fields, photo_url.as_deref()))
            .returning(StaffProfileRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn student_profile(&self, user_id: Uuid) -> AppResult<Option<StudentProfile>> {
        let mut conn = self.conn()?;
        load_student_profile(&mut conn, user_id)
    }

    fn upsert_student_profile(
        &self,
        user_id: Uuid,
        fields: StudentProfileFields,
        photo_url: Option<String>,
    ) -> AppResult<StudentProfile> {
        let mut conn = self.conn()?;
        let row: StudentProfileRow = diesel::insert_into(student_profiles::table)
            .values(&NewStudentProfileRow::new(user_id, &fields, photo_url.as_deref()))
            .on_conflict(student_profiles::user_id)
            .do_update()
            .set((
                &StudentProfileChanges::new(&fields, photo_url.as_deref()),
                student_profiles::sgpa.eq(fields.sgpa),
                student_profiles::cgpa.eq(fields.cgpa),
            ))
            .returning(StudentProfileRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn student_details(&self, student_profile_id: Uuid) -> AppResult<StudentDetails> {
        let mut conn = self.conn()?;
        let (profile, user) = student_profiles::table
            .inner_join(users::table)
            .filter(student_profiles::id.eq(student_profile_id))
            .select((StudentProfileRow::as_select(), UserRow::as_select()))
            .first::<(StudentProfileRow, UserRow)>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::StudentNotFound, "student not found"))?;

        Ok(StudentDetails {
            profile: profile.try_into()?,
            user: user.try_into()?,
            disciplinary_actions: load_actions(&mut conn, student_profile_id)?,
        })
    }

    fn list_students(&self, search: &str) -> AppResult<Vec<StudentListItem>> {
        let mut conn = self.conn()?;
        let roles: Vec<&str> = Role::STUDENT_FAMILY.iter().map(Role::as_str).collect();

        let mut query = users::table
            .left_join(student_profiles::table)
            .filter(users::role.eq_any(roles))
            .select((
                (users::id, users::first_name, users::last_name, users::role),
                Option::<StudentSummaryRow>::as_select(),
            ))
            .order(users::first_name.asc())
            .into_boxed();

        let term = search.trim();
        if !term.is_empty() {
            let pattern = like_pattern(term);
            query = query.filter(
                users::first_name
                    .ilike(pattern.clone())
                    .or(users::last_name.ilike(pattern.clone()))
                    .or(student_profiles::roll_number.ilike(pattern.clone()))
                    .or(student_profiles::room_number.assume_not_null().ilike(pattern)),
            );
        }

        let rows: Vec<((Uuid, String, String, String), Option<StudentSummaryRow>)> = query.load(&mut conn)?;

        let profile_ids: Vec<Uuid> = rows.iter().filter_map(|(_, p)| p.as_ref().map(|p| p.id)).collect();
        let counts: HashMap<Uuid, i64> = disciplinary_actions::table
            .filter(disciplinary_actions::student_profile_id.eq_any(&profile_ids))
            .group_by(disciplinary_actions::student_profile_id)
            .select((disciplinary_actions::student_profile_id, diesel::dsl::count(disciplinary_actions::id)))
            .load::<(Uuid, i64)>(&mut conn)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|((id, first_name, last_name, role), profile)| {
                Ok(StudentListItem {
                    id,
                    first_name,
                    last_name,
                    role: role.parse().map_err(AppError::internal)?,
                    student_profile: profile.map(|p| StudentListProfile {
                        disciplinary_action_count: counts.get(&p.id).copied().unwrap_or(0),
                        id: p.id,
                        roll_number: p.roll_number,
                        room_number: p.room_number,
                    }),
                })
            })
            .collect()
    }

    fn list_committee(&self) -> AppResult<Vec<CommitteeMember>> {
        let mut conn = self.conn()?;
        let roles: Vec<&str> = Role::COMMITTEE.iter().map(Role::as_str).collect();

        let rows = users::table
            .left_join(staff_profiles::table)
            .left_join(student_profiles::table)
            .filter(users::is_active.eq(true))
            .filter(users::role.eq_any(roles))
            .select((
                CommitteeUserRow::as_select(),
                Option::<StaffCardRow>::as_select(),
                Option::<StudentAdminCardRow>::as_select(),
            ))
            .load::<(CommitteeUserRow, Option<StaffCardRow>, Option<StudentAdminCardRow>)>(&mut conn)?;

        let mut members = Vec::with_capacity(rows.len());
        for (user, staff, student) in rows {
            let student = student.map(StudentAdminCard::try_from).transpose()?;
            if let Some(member) = CommitteeMember::resolve(user.try_into()?, staff.map(Into::into), student) {
                members.push(member);
            }
        }
        sort_committee(&mut members);
        Ok(members)
    }

    fn create_action(&self, action: NewDisciplinaryAction) -> AppResult<DisciplinaryAction> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            if !student_profile_exists(conn, action.student_profile_id)? {
                return Err(AppError::new(ErrorCode::StudentNotFound, "student not found"));
            }
            diesel::insert_into(disciplinary_actions::table)
                .values(&NewActionRow {
                    student_profile_id: action.student_profile_id,
                    issued_by_id: action.issued_by_id,
                    action_type: action.action_type.as_str(),
                    reason: &action.reason,
                })
                .returning(ActionRow::as_returning())
                .get_result::<ActionRow>(conn)?
                .try_into()
        })
    }

    fn update_action(&self, action_id: Uuid, changes: ActionChanges) -> AppResult<DisciplinaryAction> {
        let mut conn = self.conn()?;
        diesel::update(disciplinary_actions::table.find(action_id))
            .set(&ActionChangesRow {
                reason: changes.reason.as_deref(),
                status: changes.status.map(|s| s.as_str()),
                updated_at: Utc::now(),
            })
            .returning(ActionRow::as_returning())
            .get_result::<ActionRow>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ActionNotFound, "disciplinary action not found"))?
            .try_into()
    }

    fn actions_for_student(&self, student_profile_id: Uuid) -> AppResult<Vec<ActionEntry>> {
        let mut conn = self.conn()?;
        if !student_profile_exists(&mut conn, student_profile_id)? {
            return Err(AppError::new(ErrorCode::StudentNotFound, "student not found"));
        }
        load_actions(&mut conn, student_profile_id)
    }

    fn promote(&self, user_id: Uuid, role: Role, sub_role: AdminSubRole) -> AppResult<User> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let current: Option<String> = users::table
                .find(user_id)
                .select(users::role)
                .for_update()
                .first(conn)
                .optional()?;
            if current.as_deref() != Some(Role::Student.as_str()) {
                return Err(AppError::new(
                    ErrorCode::NotPromotable,
                    "user not found or is not a student",
                ));
            }

            let now = Utc::now();
            let user: User = diesel::update(users::table.find(user_id))
                .set((users::role.eq(role.as_str()), users::updated_at.eq(now)))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)?
                .try_into()?;

            let touched = diesel::update(student_profiles::table.filter(student_profiles::user_id.eq(user_id)))
                .set((
                    student_profiles::admin_sub_role.eq(Some(sub_role.as_str())),
                    student_profiles::admin_role_assigned_at.eq(Some(now)),
                    student_profiles::admin_role_ended_at.eq(None::<DateTime<Utc>>),
                    student_profiles::updated_at.eq(now),
                ))
                .execute(conn)?;
            if touched == 0 {
                return Err(AppError::new(ErrorCode::ProfileNotFound, "student profile not found"));
            }

            tracing::info!(user_id = %user_id, role = %role, sub_role = %sub_role, "student promoted");
            Ok(user)
        })
    }

    fn demote(&self, user_id: Uuid) -> AppResult<User> {
        let mut conn = self.conn()?;
        conn.transaction::<_, AppError, _>(|conn| {
            let current: Option<String> = users::table
                .find(user_id)
                .select(users::role)
                .for_update()
                .first(conn)
                .optional()?;
            let is_admin = current
                .as_deref()
                .and_then(|r| r.parse::<Role>().ok())
                .is_some_and(|r| r.is_student_admin());
            if !is_admin {
                return Err(AppError::new(
                    ErrorCode::NotDemotable,
                    "user not found or is not a student admin",
                ));
            }

            let now = Utc::now();
            let user: User = diesel::update(users::table.find(user_id))
                .set((users::role.eq(Role::Student.as_str()), users::updated_at.eq(now)))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)?
                .try_into()?;

            let touched = diesel::update(student_profiles::table.filter(student_profiles::user_id.eq(user_id)))
                .set((
                    student_profiles::admin_sub_role.eq(None::<&str>),
                    student_profiles::admin_role_ended_at.eq(Some(now)),
                    student_profiles::updated_at.eq(now),
                ))
                .execute(conn)?;
            if touched == 0 {
                return Err(AppError::new(ErrorCode::ProfileNotFound, "student profile not found"));
            }

            tracing::info!(user_id = %user_id, "student admin demoted");
            Ok(user)
        })
    }
}
