use crate::models::User;

/// CSV dump of users for the subscriber export: `id,name,email,phone`.
pub fn users_csv(users: &[User]) -> String {
    let mut csv = String::from("id,name,email,phone\n");
    for user in users {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            escape(&user.id),
            escape(&user.name),
            escape(&user.email),
            escape(&user.phone)
        ));
    }
    csv
}

// RFC 4180 quoting: wrap fields containing commas, quotes or newlines,
// doubling embedded quotes.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str, phone: &str) -> User {
        let mut u = User::new(name.to_string(), email.to_string(), phone.to_string());
        u.id = "u1".to_string();
        u
    }

    #[test]
    fn test_plain_fields() {
        let users = vec![user("Amina", "amina@example.com", "0700111222")];
        assert_eq!(
            users_csv(&users),
            "id,name,email,phone\nu1,Amina,amina@example.com,0700111222\n"
        );
    }

    #[test]
    fn test_comma_in_name_is_quoted() {
        let users = vec![user("Otieno, Brian", "brian@example.com", "0711")];
        let csv = users_csv(&users);
        assert!(csv.contains("\"Otieno, Brian\""));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let users = vec![user("Joy \"JJ\" W", "joy@example.com", "0722")];
        let csv = users_csv(&users);
        assert!(csv.contains("\"Joy \"\"JJ\"\" W\""));
    }

    #[test]
    fn test_empty_input_yields_header_only() {
        assert_eq!(users_csv(&[]), "id,name,email,phone\n");
    }
}
