// Built-in concept snippets, in display order.
// Sources keep the indentation they have here; the runner dedents them.

pub(super) const CONCEPTS: &[(&str, &str)] = &[
    (
        "1. Struct `self` pointers",
        r#"
        #include <stdio.h>

        struct Student {
            char name[20];
            int marks;
        };

        void student_display(const struct Student *self) {
            printf("Name: %s, Marks: %d\n", self->name, self->marks);
        }

        int main(void) {
            struct Student s = {"Alice", 92};
            student_display(&s);
            return 0;
        }
        "#,
    ),
    (
        "2. Shared counters with `static`",
        r#"
        #include <stdio.h>

        struct Counter {
            int id;
        };

        static int counter_count = 0;

        struct Counter counter_new(void) {
            counter_count++;
            struct Counter c = {counter_count};
            return c;
        }

        void counter_show_count(void) {
            printf("Objects created: %d\n", counter_count);
        }

        int main(void) {
            struct Counter a = counter_new();
            struct Counter b = counter_new();
            counter_show_count();
            printf("Ids: %d, %d\n", a.id, b.id);
            return 0;
        }
        "#,
    ),
    (
        "3. Public fields and functions",
        r#"
        #include <stdio.h>

        struct Car {
            const char *brand;
        };

        void car_start(const struct Car *self) {
            printf("%s car started\n", self->brand);
        }

        int main(void) {
            struct Car c = {"Toyota"};
            printf("%s\n", c.brand);
            car_start(&c);
            return 0;
        }
        "#,
    ),
    (
        "4. Shared global state",
        r#"
        #include <stdio.h>

        struct Bank {
            int id;
        };

        const char *bank_name = "Default Bank";

        void bank_change_name(const char *name) {
            bank_name = name;
        }

        int main(void) {
            struct Bank b1 = {1};
            struct Bank b2 = {2};
            bank_change_name("Global Bank");
            printf("Bank %d: %s\n", b1.id, bank_name);
            printf("Bank %d: %s\n", b2.id, bank_name);
            return 0;
        }
        "#,
    ),
    (
        "5. Helper functions",
        r#"
        #include <stdio.h>

        int math_add(int a, int b) {
            return a + b;
        }

        int main(void) {
            printf("%d\n", math_add(5, 7));
            return 0;
        }
        "#,
    ),
    (
        "6. Constructors and destructors",
        r#"
        #include <stdio.h>
        #include <stdlib.h>

        struct Logger {
            int lines;
        };

        struct Logger *logger_create(void) {
            struct Logger *log = malloc(sizeof(struct Logger));
            log->lines = 0;
            printf("Logger initialized\n");
            return log;
        }

        void logger_destroy(struct Logger *log) {
            free(log);
            printf("Logger destroyed\n");
        }

        int main(void) {
            struct Logger *log = logger_create();
            logger_destroy(log);
            log = NULL;
            return 0;
        }
        "#,
    ),
    (
        "7. Access control with `const`",
        r#"
        #include <stdio.h>

        struct Employee {
            char name[16];
            int salary;
        };

        int employee_salary(const struct Employee *e) {
            return e->salary;
        }

        int main(void) {
            const struct Employee e = {"John", 50000};
            printf("%s\n", e.name);
            printf("%d\n", employee_salary(&e));
            /* e.salary = 0;  rejected: e is const */
            return 0;
        }
        "#,
    ),
    (
        "8. Struct embedding",
        r#"
        #include <stdio.h>

        struct Person {
            const char *name;
        };

        struct Teacher {
            struct Person base;
            const char *subject;
        };

        void person_init(struct Person *self, const char *name) {
            self->name = name;
        }

        void teacher_init(struct Teacher *self, const char *name, const char *subject) {
            person_init(&self->base, name);
            self->subject = subject;
        }

        int main(void) {
            struct Teacher t;
            teacher_init(&t, "Ms. Rose", "Math");
            printf("%s %s\n", t.base.name, t.subject);
            return 0;
        }
        "#,
    ),
    (
        "9. Interfaces with function pointers",
        r#"
        #include <stdio.h>

        struct Shape {
            int (*area)(const struct Shape *self);
            int l;
            int w;
        };

        int rectangle_area(const struct Shape *self) {
            return self->l * self->w;
        }

        int main(void) {
            struct Shape r = {rectangle_area, 5, 3};
            printf("%d\n", r.area(&r));
            return 0;
        }
        "#,
    ),
    (
        "10. Instance-style functions",
        r#"
        #include <stdio.h>

        struct Dog {
            const char *name;
            const char *breed;
        };

        void dog_bark(const struct Dog *self) {
            printf("%s says Woof!\n", self->name);
        }

        int main(void) {
            struct Dog d = {"Buddy", "Labrador"};
            dog_bark(&d);
            return 0;
        }
        "#,
    ),
    (
        "11. Counting with `static` locals",
        r#"
        #include <stdio.h>

        int book_increment_count(void) {
            static int total_books = 0;
            total_books += 1;
            return total_books;
        }

        int main(void) {
            book_increment_count();
            printf("%d\n", book_increment_count());
            return 0;
        }
        "#,
    ),
    (
        "12. Pure functions",
        r#"
        #include <stdio.h>

        int celsius_to_fahrenheit(int c) {
            return c * 9 / 5 + 32;
        }

        int main(void) {
            printf("%d\n", celsius_to_fahrenheit(25));
            return 0;
        }
        "#,
    ),
    (
        "13. Composition",
        r#"
        #include <stdio.h>

        struct Engine {
            int cylinders;
        };

        struct Car {
            struct Engine engine;
        };

        void engine_start(const struct Engine *self) {
            printf("Engine started (%d cylinders)\n", self->cylinders);
        }

        void car_start(const struct Car *self) {
            engine_start(&self->engine);
        }

        int main(void) {
            struct Car c = {{4}};
            car_start(&c);
            return 0;
        }
        "#,
    ),
    (
        "14. Aggregation",
        r#"
        #include <stdio.h>

        struct Employee {
            const char *name;
        };

        struct Department {
            struct Employee *employee;
        };

        int main(void) {
            struct Employee emp = {"Alice"};
            struct Department dept = {&emp};
            printf("%s\n", dept.employee->name);
            return 0;
        }
        "#,
    ),
    (
        "15. Dispatch tables",
        r#"
        #include <stdio.h>

        typedef void (*ShowFn)(void);

        void show_a(void) { printf("A\n"); }
        void show_b(void) { printf("B\n"); }
        void show_c(void) { printf("C\n"); }

        int main(void) {
            /* D has no show of its own: search B, then C, then A */
            ShowFn lookup[] = {NULL, show_b, show_c, show_a};
            for (int i = 0; i < 4; i++) {
                if (lookup[i] != NULL) {
                    lookup[i]();
                    break;
                }
            }
            return 0;
        }
        "#,
    ),
    (
        "16. Function wrappers",
        r#"
        #include <stdio.h>

        typedef void (*Action)(void);

        void log_function_call(Action func) {
            printf("Function is being called\n");
            func();
        }

        void say_hello(void) {
            printf("Hello!\n");
        }

        int main(void) {
            log_function_call(say_hello);
            return 0;
        }
        "#,
    ),
    (
        "17. Attaching behaviour at runtime",
        r#"
        #include <stdio.h>

        struct Person {
            const char *(*greet)(void);
        };

        const char *decorated_greeting(void) {
            return "Hello from Decorator!";
        }

        void add_greeting(struct Person *p) {
            p->greet = decorated_greeting;
        }

        int main(void) {
            struct Person p = {NULL};
            add_greeting(&p);
            printf("%s\n", p.greet());
            return 0;
        }
        "#,
    ),
    (
        "18. Getters and setters",
        r#"
        #include <assert.h>
        #include <stdio.h>

        struct Product {
            int price;
        };

        int product_get_price(const struct Product *p) {
            return p->price;
        }

        void product_set_price(struct Product *p, int value) {
            assert(value >= 0 && "price must not be negative");
            p->price = value;
        }

        int main(void) {
            struct Product p = {0};
            product_set_price(&p, 100);
            printf("%d\n", product_get_price(&p));
            return 0;
        }
        "#,
    ),
    (
        "19. Callable objects",
        r#"
        #include <stdio.h>

        struct Multiplier {
            int factor;
            int (*call)(const struct Multiplier *self, int value);
        };

        int multiply(const struct Multiplier *self, int value) {
            return value * self->factor;
        }

        int main(void) {
            struct Multiplier m = {3, multiply};
            printf("%d\n", m.call != NULL);
            printf("%d\n", m.call(&m, 10));
            return 0;
        }
        "#,
    ),
    (
        "20. Error codes",
        r#"
        #include <stdio.h>

        int check_age(int age, const char **error) {
            if (age < 18) {
                *error = "Age must be 18 or above";
                return -1;
            }
            return 0;
        }

        int main(void) {
            const char *error = NULL;
            if (check_age(16, &error) != 0) {
                printf("Error: %s\n", error);
            }
            return 0;
        }
        "#,
    ),
    (
        "21. Iterators",
        r#"
        #include <stdio.h>

        struct Countdown {
            int current;
        };

        int countdown_next(struct Countdown *it, int *value) {
            if (it->current < 0) {
                return 0;
            }
            *value = it->current;
            it->current -= 1;
            return 1;
        }

        int main(void) {
            struct Countdown it = {5};
            int i;
            while (countdown_next(&it, &i)) {
                printf("%d\n", i);
            }
            return 0;
        }
        "#,
    ),
];
