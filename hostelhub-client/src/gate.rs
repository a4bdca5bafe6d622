//! Navigation guards as a pure decision over the session and target page.

use hostelhub_shared::types::auth::ProfileKind;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Landing,
    Committee,
    Notifications,
    Login,
    Dashboard,
    StaffProfile,
    StudentProfile,
    AddStudent,
    CreateStaff,
    Students,
    StudentDetails(String),
    StudentActions(String),
    StaffDetails(String),
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Page::Landing,
            ["committee"] => Page::Committee,
            ["notifications"] => Page::Notifications,
            ["login"] => Page::Login,
            ["staff", "profile"] => Page::StaffProfile,
            ["student", "profile"] => Page::StudentProfile,
            ["add-student"] => Page::AddStudent,
            ["create-staff"] => Page::CreateStaff,
            ["students"] => Page::Students,
            ["student", id] => Page::StudentDetails(id.to_string()),
            ["student", id, "actions"] => Page::StudentActions(id.to_string()),
            ["staff", id] => Page::StaffDetails(id.to_string()),
            // Unknown paths fall through to the dashboard.
            _ => Page::Dashboard,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Page::Landing | Page::Committee | Page::Notifications | Page::Login | Page::StaffDetails(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Allow,
    Login,
    StaffProfile,
    StudentProfile,
}

/// Where a navigation to `page` actually lands.
///
/// Protected pages need a session; signed-in users without their profile are
/// held on the profile form until it exists.
pub fn destination(session: Option<&Session>, page: &Page) -> Destination {
    if page.is_public() {
        return Destination::Allow;
    }
    let Some(session) = session else {
        return Destination::Login;
    };
    match session.role().profile_kind() {
        ProfileKind::Staff if !session.has_staff_profile() && *page != Page::StaffProfile => {
            Destination::StaffProfile
        }
        ProfileKind::Student if !session.has_student_profile() && *page != Page::StudentProfile => {
            Destination::StudentProfile
        }
        _ => Destination::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentProfile;
    use crate::session::tests::session_for;
    use chrono::NaiveDate;
    use hostelhub_shared::types::auth::Role;
    use uuid::Uuid;

    fn student_profile() -> StudentProfile {
        StudentProfile {
            id: Uuid::new_v4(),
            roll_number: "21CS001".into(),
            room_number: Some("B-204".into()),
            current_sem: None,
            sgpa: None,
            cgpa: None,
            department: "CSE".into(),
            school: "Engineering".into(),
            student_contact_number: "900".into(),
            guardian_name: "G".into(),
            guardian_contact: "911".into(),
            course_start_date: NaiveDate::from_ymd_opt(2022, 8, 1).unwrap(),
            expected_course_end_date: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            profile_photo_url: None,
            admin_sub_role: None,
            admin_role_assigned_at: None,
            admin_role_ended_at: None,
        }
    }

    #[test]
    fn paths_map_to_pages() {
        assert_eq!(Page::from_path("/"), Page::Landing);
        assert_eq!(Page::from_path("/staff/profile"), Page::StaffProfile);
        assert_eq!(Page::from_path("/student/abc/actions"), Page::StudentActions("abc".into()));
        assert_eq!(Page::from_path("/nowhere/at/all"), Page::Dashboard);
    }

    #[test]
    fn public_pages_need_no_session() {
        assert_eq!(destination(None, &Page::Committee), Destination::Allow);
        assert_eq!(destination(None, &Page::Login), Destination::Allow);
        assert_eq!(destination(None, &Page::Dashboard), Destination::Login);
    }

    #[test]
    fn staff_without_profile_is_held_on_profile_form() {
        let warden = session_for(Role::Warden);
        assert_eq!(destination(Some(&warden), &Page::Dashboard), Destination::StaffProfile);
        assert_eq!(destination(Some(&warden), &Page::StaffProfile), Destination::Allow);
    }

    #[test]
    fn student_family_needs_student_profile() {
        for role in Role::STUDENT_FAMILY {
            let mut session = session_for(role);
            assert_eq!(destination(Some(&session), &Page::Dashboard), Destination::StudentProfile);
            assert_eq!(destination(Some(&session), &Page::StudentProfile), Destination::Allow);

            session.user.student_profile = Some(student_profile());
            assert_eq!(destination(Some(&session), &Page::Dashboard), Destination::Allow);
        }
    }
}
