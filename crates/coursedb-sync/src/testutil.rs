//! In-memory collaborators shared by the unit tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::config::{LocalCategoryField, LocalCourseField};
use crate::error::{SyncError, SyncResult};
use crate::store::CourseStore;
use crate::types::{
    CategoryId, CourseId, CourseShell, CourseTemplate, CourseUpdate, GroupMode, LocalCourse,
    TextFormat,
};

pub(crate) fn template_fixture() -> CourseTemplate {
    CourseTemplate {
        summary: String::new(),
        summary_format: TextFormat::Html,
        format: "topics".to_string(),
        num_sections: 4,
        news_items: 5,
        show_grades: true,
        show_reports: false,
        max_bytes: 0,
        group_mode: GroupMode::None,
        group_mode_force: false,
        visible: true,
        lang: String::new(),
        enable_completion: true,
        start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        end_date: None,
    }
}

pub(crate) fn course_fixture(id: i64, shortname: &str) -> LocalCourse {
    LocalCourse {
        id: CourseId::new(id),
        visible: true,
        fullname: format!("{shortname} full name"),
        shortname: shortname.to_string(),
        idnumber: String::new(),
        category: CategoryId::new(1),
        template: template_fixture(),
    }
}

/// Course store backed by vectors, for unit tests.
pub(crate) struct InMemoryStore {
    courses: Mutex<Vec<LocalCourse>>,
    categories: Mutex<Vec<(CategoryId, String)>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            courses: Mutex::new(Vec::new()),
            categories: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    pub(crate) fn add_course(&self, course: LocalCourse) {
        self.courses.lock().unwrap().push(course);
    }

    pub(crate) fn add_category(&self, id: i64, idnumber: &str) {
        self.categories
            .lock()
            .unwrap()
            .push((CategoryId::new(id), idnumber.to_string()));
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn find_course(
        &self,
        field: LocalCourseField,
        value: &str,
    ) -> SyncResult<Option<LocalCourse>> {
        let courses = self.courses.lock().unwrap();
        let found = courses.iter().find(|c| match field {
            LocalCourseField::Id => value.parse::<i64>().is_ok_and(|id| c.id.value() == id),
            LocalCourseField::Idnumber => c.idnumber == value,
            LocalCourseField::Shortname => c.shortname == value,
        });
        Ok(found.cloned())
    }

    async fn find_category(
        &self,
        field: LocalCategoryField,
        value: &str,
    ) -> SyncResult<Option<CategoryId>> {
        let categories = self.categories.lock().unwrap();
        let found = categories.iter().find(|(id, idnumber)| match field {
            LocalCategoryField::Id => value.parse::<i64>().is_ok_and(|v| id.value() == v),
            LocalCategoryField::Idnumber => idnumber == value,
        });
        Ok(found.map(|(id, _)| *id))
    }

    async fn shortname_exists(&self, shortname: &str) -> SyncResult<bool> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.shortname == shortname))
    }

    async fn idnumber_exists(&self, idnumber: &str) -> SyncResult<bool> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.idnumber == idnumber))
    }

    async fn create(&self, shell: CourseShell) -> SyncResult<LocalCourse> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let course = LocalCourse {
            id: CourseId::new(id),
            visible: shell.template.visible,
            fullname: shell.fullname,
            shortname: shell.shortname,
            idnumber: shell.idnumber,
            category: shell.category,
            template: shell.template,
        };
        self.courses.lock().unwrap().push(course.clone());
        Ok(course)
    }

    async fn update(&self, update: CourseUpdate) -> SyncResult<()> {
        let mut courses = self.courses.lock().unwrap();
        let course = courses
            .iter_mut()
            .find(|c| c.id == update.id)
            .ok_or_else(|| SyncError::store(format!("course {} not found", update.id)))?;
        course.fullname = update.fullname;
        course.shortname = update.shortname;
        course.idnumber = update.idnumber;
        if let Some(category) = update.category {
            course.category = category;
        }
        Ok(())
    }
}
