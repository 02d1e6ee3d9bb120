use crate::model::{Comment, User};
use crate::node::{Element, Fragment};

pub fn build_text_element(tag: &str, text: &str, class: Option<&str>) -> Element {
    let element = Element::new(tag).with_text(text);
    match class {
        Some(class) => element.with_class(class),
        None => element,
    }
}

/// One `<option>` per user, value = id, label = name, in input order.
pub fn build_select_options(users: Option<&[User]>) -> Option<Vec<Element>> {
    let users = users?;
    Some(
        users
            .iter()
            .map(|user| {
                Element::new("option")
                    .with_attr("value", user.id.to_string())
                    .with_text(user.name.as_str())
            })
            .collect(),
    )
}

pub fn build_comment_fragment(comments: Option<&[Comment]>) -> Option<Fragment> {
    let comments = comments?;
    Some(
        comments
            .iter()
            .map(|comment| {
                Element::new("article")
                    .with_child(build_text_element("h3", &comment.name, None))
                    .with_child(build_text_element("p", &comment.body, None))
                    .with_child(build_text_element(
                        "p",
                        &format!("From: {}", comment.email),
                        None,
                    ))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_user;
    use crate::model::PostId;

    #[test]
    fn text_element_carries_optional_class() {
        let plain = build_text_element("p", "hello", None);
        assert_eq!(plain.to_html(), "<p>hello</p>");
        let classed = build_text_element("p", "hello", Some("author"));
        assert!(classed.has_class("author"));
    }

    #[test]
    fn one_option_per_user_in_order() {
        let users = vec![
            sample_user(5, "Chelsey Dietrich", "Keebler LLC", "User-centric"),
            sample_user(2, "Ervin Howell", "Deckow-Crist", "Proactive"),
            sample_user(9, "Glenna Reichert", "Yost and Sons", "Switchable"),
        ];
        let options = build_select_options(Some(&users)).unwrap();
        assert_eq!(options.len(), 3);
        let pairs: Vec<_> = options
            .iter()
            .map(|opt| (opt.attr("value").unwrap(), opt.text().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("5", "Chelsey Dietrich"),
                ("2", "Ervin Howell"),
                ("9", "Glenna Reichert"),
            ]
        );
    }

    #[test]
    fn absent_input_builds_nothing() {
        assert!(build_select_options(None).is_none());
        assert!(build_comment_fragment(None).is_none());
    }

    #[test]
    fn comment_article_has_three_lines() {
        let comments = vec![Comment {
            id: 1,
            post_id: PostId(1),
            name: "id labore ex et quam laborum".into(),
            email: "Eliseo@gardner.biz".into(),
            body: "laudantium enim quasi".into(),
        }];
        let fragment = build_comment_fragment(Some(&comments)).unwrap();
        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.elements()[0].to_html(),
            "<article><h3>id labore ex et quam laborum</h3><p>laudantium enim quasi</p><p>From: Eliseo@gardner.biz</p></article>"
        );
    }
}
