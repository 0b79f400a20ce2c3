//! Staff accounts, and the departments and roles they belong to.

use super::AttendanceManager;
use crate::error::{AttendanceError, AttendanceResult};
use crate::identity::{Identity, require_admin};
use crate::models::{
    Department, Employee, NewDepartment, NewEmployee, NewEmployeeRow, NewRole, Role,
};
use crate::password::hash_password;
use crate::schema::{departments, employees, roles};
use diesel::prelude::*;

impl AttendanceManager {
    /// Creates a regular (non-admin) employee account. Anyone may register.
    pub fn register_employee(&mut self, new: &NewEmployee) -> AttendanceResult<Employee> {
        self.insert_employee(new, false)
    }

    /// Creates the first administrator. Once any administrator exists this is
    /// [`AttendanceError::Forbidden`], and new admins must be granted by an existing one.
    ///
    /// The admin check and the insert run in one transaction.
    pub fn bootstrap_admin(&mut self, new: &NewEmployee) -> AttendanceResult<Employee> {
        self.insert_employee(new, true).inspect_err(|err| {
            if matches!(err, AttendanceError::Forbidden) {
                tracing::warn!(username = %new.username, "refused to bootstrap a second administrator");
            }
        })
    }

    /// Inserts an employee. Admin rows are only written while the table holds no other admin.
    fn insert_employee(&mut self, new: &NewEmployee, is_admin: bool) -> AttendanceResult<Employee> {
        let password_hash = hash_password(&new.password)?;

        let row = NewEmployeeRow {
            email: &new.email,
            username: &new.username,
            first_name: &new.first_name,
            last_name: &new.last_name,
            password_hash: &password_hash,
            is_admin,
            forum: new.forum.as_deref(),
        };

        let employee = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                if is_admin {
                    let admins: i64 = employees::table
                        .filter(employees::is_admin.eq(true))
                        .count()
                        .get_result(conn)?;
                    if admins > 0 {
                        return Err(AttendanceError::Forbidden);
                    }
                }

                Ok(diesel::insert_into(employees::table)
                    .values(&row)
                    .returning(Employee::as_returning())
                    .get_result(conn)?)
            })
            .map_err(|err| err.describe_violation("email or username already in use"))?;

        tracing::info!(id = employee.id, username = %employee.username, is_admin, "registered employee");

        Ok(employee)
    }

    /// Checks a username (or email) and password, returning the identity to act as.
    pub fn authenticate(&mut self, login: &str, password: &str) -> AttendanceResult<Identity> {
        let employee = employees::table
            .filter(employees::username.eq(login).or(employees::email.eq(login)))
            .select(Employee::as_select())
            .first(&mut self.db)
            .optional()?;

        match employee {
            Some(employee) if employee.verify_password(password) => {
                tracing::debug!(username = %employee.username, "authenticated");
                Ok(Identity::from(&employee))
            }
            _ => {
                tracing::warn!(login, "failed login attempt");
                Err(AttendanceError::InvalidCredentials)
            }
        }
    }

    pub fn list_employees(&mut self, identity: &Identity) -> AttendanceResult<Vec<Employee>> {
        require_admin(identity)?;

        Ok(employees::table
            .order(employees::username.asc())
            .select(Employee::as_select())
            .load(&mut self.db)?)
    }

    /// Places an employee in a department and role. `None` clears the assignment.
    pub fn assign_employee(
        &mut self,
        identity: &Identity,
        username: &str,
        department_id: Option<i32>,
        role_id: Option<i32>,
    ) -> AttendanceResult<Employee> {
        require_admin(identity)?;

        let employee = self
            .db
            .transaction::<_, AttendanceError, _>(|conn| {
                diesel::update(employees::table.filter(employees::username.eq(username)))
                    .set((
                        employees::department_id.eq(department_id),
                        employees::role_id.eq(role_id),
                    ))
                    .returning(Employee::as_returning())
                    .get_result(conn)
                    .optional()?
                    .ok_or_else(|| AttendanceError::not_found("Employee", username))
            })
            .map_err(|err| err.describe_violation("no such department or role"))?;

        tracing::info!(username, ?department_id, ?role_id, "assigned employee");

        Ok(employee)
    }

    /// Grants or revokes administrator privileges.
    pub fn set_admin(
        &mut self,
        identity: &Identity,
        username: &str,
        is_admin: bool,
    ) -> AttendanceResult<Employee> {
        require_admin(identity)?;

        let employee = diesel::update(employees::table.filter(employees::username.eq(username)))
            .set(employees::is_admin.eq(is_admin))
            .returning(Employee::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| AttendanceError::not_found("Employee", username))?;

        tracing::info!(username, is_admin, granted_by = %identity.username, "changed admin status");

        Ok(employee)
    }

    /// Sets the forum an employee teaches.
    pub fn set_forum(
        &mut self,
        identity: &Identity,
        username: &str,
        forum: Option<&str>,
    ) -> AttendanceResult<Employee> {
        require_admin(identity)?;

        let employee = diesel::update(employees::table.filter(employees::username.eq(username)))
            .set(employees::forum.eq(forum))
            .returning(Employee::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| AttendanceError::not_found("Employee", username))?;

        tracing::info!(username, ?forum, "changed employee forum");

        Ok(employee)
    }

    pub fn list_departments(&mut self, identity: &Identity) -> AttendanceResult<Vec<Department>> {
        require_admin(identity)?;

        Ok(departments::table
            .order(departments::name.asc())
            .select(Department::as_select())
            .load(&mut self.db)?)
    }

    pub fn add_department(
        &mut self,
        identity: &Identity,
        name: &str,
        description: Option<&str>,
    ) -> AttendanceResult<Department> {
        require_admin(identity)?;
        AttendanceError::require_field("department name", name)?;

        let department = diesel::insert_into(departments::table)
            .values(&NewDepartment { name, description })
            .returning(Department::as_returning())
            .get_result(&mut self.db)
            .map_err(|err| {
                AttendanceError::from(err).describe_violation("department name already exists")
            })?;

        tracing::info!(id = department.id, name, "added department");

        Ok(department)
    }

    pub fn edit_department(
        &mut self,
        identity: &Identity,
        department_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> AttendanceResult<Department> {
        require_admin(identity)?;
        AttendanceError::require_field("department name", name)?;

        diesel::update(departments::table.find(department_id))
            .set((
                departments::name.eq(name),
                departments::description.eq(description),
            ))
            .returning(Department::as_returning())
            .get_result(&mut self.db)
            .optional()
            .map_err(|err| {
                AttendanceError::from(err).describe_violation("department name already exists")
            })?
            .ok_or_else(|| AttendanceError::not_found("Department", department_id))
    }

    /// Removes a department. Its employees are left without one.
    pub fn delete_department(
        &mut self,
        identity: &Identity,
        department_id: i32,
    ) -> AttendanceResult<Department> {
        require_admin(identity)?;

        let department = diesel::delete(departments::table.find(department_id))
            .returning(Department::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| AttendanceError::not_found("Department", department_id))?;

        tracing::info!(id = department_id, name = %department.name, "deleted department");

        Ok(department)
    }

    pub fn list_roles(&mut self, identity: &Identity) -> AttendanceResult<Vec<Role>> {
        require_admin(identity)?;

        Ok(roles::table
            .order(roles::name.asc())
            .select(Role::as_select())
            .load(&mut self.db)?)
    }

    pub fn add_role(
        &mut self,
        identity: &Identity,
        name: &str,
        description: Option<&str>,
    ) -> AttendanceResult<Role> {
        require_admin(identity)?;
        AttendanceError::require_field("role name", name)?;

        let role = diesel::insert_into(roles::table)
            .values(&NewRole { name, description })
            .returning(Role::as_returning())
            .get_result(&mut self.db)
            .map_err(|err| AttendanceError::from(err).describe_violation("role name already exists"))?;

        tracing::info!(id = role.id, name, "added role");

        Ok(role)
    }

    pub fn edit_role(
        &mut self,
        identity: &Identity,
        role_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> AttendanceResult<Role> {
        require_admin(identity)?;
        AttendanceError::require_field("role name", name)?;

        diesel::update(roles::table.find(role_id))
            .set((roles::name.eq(name), roles::description.eq(description)))
            .returning(Role::as_returning())
            .get_result(&mut self.db)
            .optional()
            .map_err(|err| AttendanceError::from(err).describe_violation("role name already exists"))?
            .ok_or_else(|| AttendanceError::not_found("Role", role_id))
    }

    /// Removes a role. Its employees are left without one.
    pub fn delete_role(&mut self, identity: &Identity, role_id: i32) -> AttendanceResult<Role> {
        require_admin(identity)?;

        let role = diesel::delete(roles::table.find(role_id))
            .returning(Role::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| AttendanceError::not_found("Role", role_id))?;

        tracing::info!(id = role_id, name = %role.name, "deleted role");

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::test_support::{fellow, manager, outsider};

    fn new_employee(username: &str) -> NewEmployee {
        NewEmployee {
            email: format!("{username}@example.edu"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "Person".to_string(),
            password: "s3cret".to_string(),
            forum: Some("F1".to_string()),
        }
    }

    #[test]
    fn registered_employees_are_not_admins() {
        let mut manager = manager();
        let employee = manager.register_employee(&new_employee("ada")).unwrap();

        assert!(!employee.is_admin);
        assert_ne!(employee.password_hash, "s3cret");
        assert!(employee.verify_password("s3cret"));
        assert!(!format!("{employee:?}").contains(&employee.password_hash));
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let mut manager = manager();
        manager.register_employee(&new_employee("ada")).unwrap();

        let err = manager.register_employee(&new_employee("ada")).unwrap_err();
        assert!(matches!(err, AttendanceError::ConstraintViolation(_)));

        let mut same_email = new_employee("grace");
        same_email.email = "ada@example.edu".to_string();
        assert!(matches!(
            manager.register_employee(&same_email),
            Err(AttendanceError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn authenticate_by_username_or_email() {
        let mut manager = manager();
        manager.bootstrap_admin(&new_employee("ada")).unwrap();

        let identity = manager.authenticate("ada", "s3cret").unwrap();
        assert!(identity.is_admin);
        assert_eq!(identity.forum, "F1");
        assert!(identity.employee_id.is_some());

        assert_eq!(
            manager.authenticate("ada@example.edu", "s3cret").unwrap(),
            identity
        );
        assert!(matches!(
            manager.authenticate("ada", "wrong"),
            Err(AttendanceError::InvalidCredentials)
        ));
        assert!(matches!(
            manager.authenticate("nobody", "s3cret"),
            Err(AttendanceError::InvalidCredentials)
        ));
    }

    #[test]
    fn only_one_admin_can_be_bootstrapped() {
        let mut manager = manager();
        manager.bootstrap_admin(&new_employee("ada")).unwrap();

        assert!(matches!(
            manager.bootstrap_admin(&new_employee("mallory")),
            Err(AttendanceError::Forbidden)
        ));

        let employees: i64 = employees::table.count().get_result(&mut manager.db).unwrap();
        assert_eq!(employees, 1);
        assert!(matches!(
            manager.authenticate("mallory", "s3cret"),
            Err(AttendanceError::InvalidCredentials)
        ));
    }

    #[test]
    fn admins_grant_admin_and_forum() {
        let mut manager = manager();
        manager.register_employee(&new_employee("grace")).unwrap();
        let tf = fellow("F1");

        manager.set_admin(&tf, "grace", true).unwrap();
        manager.set_forum(&tf, "grace", Some("F7")).unwrap();

        let identity = manager.authenticate("grace", "s3cret").unwrap();
        assert!(identity.is_admin);
        assert_eq!(identity.forum, "F7");

        assert!(matches!(
            manager.set_admin(&tf, "nobody", true),
            Err(AttendanceError::NotFound { entity: "Employee", .. })
        ));
    }

    #[test]
    fn assign_employee_to_department_and_role() {
        let mut manager = manager();
        let tf = fellow("F1");
        manager.register_employee(&new_employee("grace")).unwrap();
        let department = manager.add_department(&tf, "Computing", None).unwrap();
        let role = manager
            .add_role(&tf, "Teaching Fellow", Some("Runs a forum"))
            .unwrap();

        let grace = manager
            .assign_employee(&tf, "grace", Some(department.id), Some(role.id))
            .unwrap();
        assert_eq!(grace.department_id, Some(department.id));
        assert_eq!(grace.role_id, Some(role.id));

        assert!(matches!(
            manager.assign_employee(&tf, "grace", Some(999), None),
            Err(AttendanceError::ConstraintViolation(_))
        ));

        // Removing the department detaches its employees.
        manager.delete_department(&tf, department.id).unwrap();
        let grace = manager.list_employees(&tf).unwrap().remove(0);
        assert_eq!(grace.department_id, None);
        assert_eq!(grace.role_id, Some(role.id));
    }

    #[test]
    fn department_and_role_names_are_unique() {
        let mut manager = manager();
        let tf = fellow("F1");
        let computing = manager.add_department(&tf, "Computing", None).unwrap();
        let maths = manager.add_department(&tf, "Maths", None).unwrap();

        assert!(matches!(
            manager.add_department(&tf, "Computing", None),
            Err(AttendanceError::ConstraintViolation(_))
        ));
        assert!(matches!(
            manager.edit_department(&tf, maths.id, "Computing", None),
            Err(AttendanceError::ConstraintViolation(_))
        ));

        let renamed = manager
            .edit_department(&tf, computing.id, "Computer Science", Some("CS"))
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("CS"));

        let role = manager.add_role(&tf, "Mentor", None).unwrap();
        assert!(matches!(
            manager.add_role(&tf, "Mentor", None),
            Err(AttendanceError::ConstraintViolation(_))
        ));
        manager.edit_role(&tf, role.id, "Senior Mentor", None).unwrap();
        assert_eq!(manager.delete_role(&tf, role.id).unwrap().name, "Senior Mentor");
        assert!(manager.list_roles(&tf).unwrap().is_empty());
        assert!(matches!(
            manager.delete_role(&tf, role.id),
            Err(AttendanceError::NotFound { entity: "Role", .. })
        ));
    }

    #[test]
    fn non_admins_cannot_administer_staff() {
        let mut manager = manager();
        let nobody = outsider("F1");
        manager.register_employee(&new_employee("grace")).unwrap();

        assert!(matches!(
            manager.set_admin(&nobody, "grace", true),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.list_employees(&nobody),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.add_department(&nobody, "Computing", None),
            Err(AttendanceError::Forbidden)
        ));
        assert!(matches!(
            manager.add_role(&nobody, "Mentor", None),
            Err(AttendanceError::Forbidden)
        ));
        assert!(!manager.authenticate("grace", "s3cret").unwrap().is_admin);
    }
}
